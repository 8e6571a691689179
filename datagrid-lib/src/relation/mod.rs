//! Relation resolution and caching.
//!
//! Columns declared with a [`RelationDescriptor`](crate::model::RelationDescriptor)
//! hold a foreign key. After a load, [`resolve_relations`] looks each key up
//! through a [`RelationFetcher`], memoizes the result in a [`RelationCache`]
//! and attaches the entity to the record under the relation's table name.

mod cache;
mod fetcher;
mod labels;
mod resolve;

pub use cache::*;
pub use fetcher::*;
pub use labels::*;
pub use resolve::*;
