//! Remote query adapter.
//!
//! Ships a [`QueryRequest`](crate::query::QueryRequest) to a remote data
//! source using the query-parameter grammar and normalizes whatever comes
//! back into a [`SourcePage`](crate::query::SourcePage). The remote side is
//! trusted to apply the same search, filter and sort semantics as the local
//! pipeline.

mod client;
mod response;
mod retry;

pub use client::*;
pub use response::*;
pub use retry::*;
