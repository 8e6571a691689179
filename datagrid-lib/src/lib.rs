//! Data grid query engine
//!
//! Declarative search, filter, sort and pagination over tabular records,
//! either locally or through a remote endpoint, with relation resolution
//! and CSV export.

pub mod error;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod relation;
pub mod remote;
pub mod server;
pub mod table;

pub use error::Error;
pub use table::Table;
pub use table::TableConfig;
