//! Declarative query types.
//!
//! This module holds everything a caller uses to describe *what* rows a table
//! should show: filters, the active sort, the requested page, and the wire
//! grammar used to ship the same query to a remote source.
//!
//! # Shared Types
//!
//! - [`Filter`] - A bare equality value or an operator-tagged condition
//! - [`SortConfig`] - The single active sort
//! - [`Pagination`] - Page position and the post-filter total
//! - [`QueryRequest`] - The full query handed to providers and remote sources
//! - [`SourcePage`] - Records returned by a source, with an optional total

mod filter;
mod order;
mod page;
pub mod params;
mod request;

pub use filter::Filter;
pub use filter::FilterOp;
pub use filter::FilterSet;
pub use order::Direction;
pub use order::SortConfig;
pub use page::Pagination;
pub use page::SourcePage;
pub use request::QueryRequest;
