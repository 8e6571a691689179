//! Query request handed to data sources.

use super::FilterSet;
use super::Pagination;
use super::SortConfig;

/// The full declarative query of a table.
///
/// Custom providers and remote sources receive this and are expected to
/// apply the same semantics the local pipeline does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    /// Requested page (its `total` is ignored on the way out).
    pub pagination: Pagination,
    /// Active sort.
    pub sort: Option<SortConfig>,
    /// Active filters.
    pub filters: FilterSet,
    /// Free-text search query.
    pub search: String,
    /// Names of relations to embed.
    pub relations: Vec<String>,
}

impl QueryRequest {
    /// Creates a request for the first page with the given page size.
    pub fn new(per_page: usize) -> Self {
        Self {
            pagination: Pagination::new(per_page),
            ..Self::default()
        }
    }

    /// Sets the page.
    pub fn page(mut self, page: usize) -> Self {
        self.pagination.page = page;
        self
    }

    /// Sets the sort.
    pub fn sort(mut self, sort: SortConfig) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Adds a filter.
    pub fn filter(mut self, key: impl Into<String>, filter: super::Filter) -> Self {
        self.filters.insert(key.into(), filter);
        self
    }

    /// Sets the search query.
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Sets the relations to embed.
    pub fn relations<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations = relations.into_iter().map(Into::into).collect();
        self
    }
}
