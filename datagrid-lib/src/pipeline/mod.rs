//! The client-side query pipeline.
//!
//! A query runs in a fixed order over a copy of the collection:
//!
//! 1. [`apply_search`] keeps rows containing the search text
//! 2. [`apply_filters`] keeps rows satisfying every active filter
//! 3. [`apply_sort`] orders the survivors stably
//! 4. [`paginate`] slices out the requested page
//!
//! The total reported alongside a page is the count after step 2.

pub mod coerce;
mod compare;
mod filter;
mod paginate;
mod search;
mod sort;

pub use compare::compare;
pub use compare::compare_field;
pub use filter::apply_filters;
pub use filter::matches_filter;
pub use filter::matches_filters;
pub use paginate::page_range;
pub use paginate::paginate;
pub use search::apply_search;
pub use search::matches_search;
pub use search::searchable_columns;
pub use sort::apply_sort;
pub use sort::compare_keys;
pub use sort::compare_records;
pub use sort::locale_cmp;

use log::debug;

use crate::model::Column;
use crate::model::Record;
use crate::query::QueryRequest;

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    /// Rows of the requested page.
    pub rows: Vec<Record>,
    /// Number of rows matching search and filters.
    pub total: usize,
}

/// Runs search, filters and sort, returning every matching row in order.
pub fn prepare(records: Vec<Record>, columns: &[Column], request: &QueryRequest) -> Vec<Record> {
    let before = records.len();
    let records = apply_search(records, &request.search, columns);
    let searched = records.len();
    let records = apply_filters(records, &request.filters, columns);
    debug!(
        "query pipeline: {} rows, {} after search, {} after filters",
        before,
        searched,
        records.len()
    );
    match &request.sort {
        Some(sort) => apply_sort(records, sort),
        None => records,
    }
}

/// Counts the records matching the request's search and filters.
pub fn count_matching(records: &[Record], columns: &[Column], request: &QueryRequest) -> usize {
    let needle = request.search.trim().to_lowercase();
    let searchable = searchable_columns(columns);
    records
        .iter()
        .filter(|record| needle.is_empty() || matches_search(record, &needle, &searchable))
        .filter(|record| matches_filters(record, &request.filters, columns))
        .count()
}

/// Runs the full pipeline and returns the requested page with the total.
pub fn process(records: Vec<Record>, columns: &[Column], request: &QueryRequest) -> QueryResult {
    let prepared = prepare(records, columns, request);
    let total = prepared.len();
    let range = page_range(total, request.pagination.page, request.pagination.per_page);
    let rows = prepared
        .into_iter()
        .skip(range.start)
        .take(range.len())
        .collect();
    QueryResult { rows, total }
}
