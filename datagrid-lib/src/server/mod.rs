//! Server side of the remote protocol.
//!
//! [`TableEngine`] answers `data`, `relation`, `relation-options` and
//! `export` requests over in-memory records; [`serve`] exposes it over
//! HTTP/1.

mod engine;
mod http;

pub use engine::*;
pub use http::*;
