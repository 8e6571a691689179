//! Table configuration.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::model::Column;
use crate::model::Record;
use crate::query::FilterSet;
use crate::query::QueryRequest;
use crate::query::SortConfig;
use crate::query::SourcePage;
use crate::relation::RelationConfig;

/// Where pagination happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    /// The table holds the full collection and slices it locally.
    #[default]
    Client,
    /// The source returns only the requested page and the total.
    Server,
}

/// A custom data source invoked with the current query.
///
/// In server mode the provider is expected to apply search, filters, sort and
/// pagination itself and report the total.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Produces records for a query.
    async fn fetch(&self, request: &QueryRequest) -> Result<SourcePage, Error>;
}

/// Where a table gets its records.
#[derive(Clone)]
pub enum DataSource {
    /// A fixed in-memory collection.
    Static(Vec<Record>),
    /// A custom async provider.
    Provider(Arc<dyn DataProvider>),
    /// A remote endpoint URL speaking the query-parameter grammar.
    Remote(String),
    /// An already shaped page (records plus optional total).
    Shaped(SourcePage),
}

impl DataSource {
    /// Wraps a provider.
    pub fn provider(provider: impl DataProvider + 'static) -> Self {
        DataSource::Provider(Arc::new(provider))
    }

    /// Creates a remote source.
    pub fn remote(url: impl Into<String>) -> Self {
        DataSource::Remote(url.into())
    }
}

impl From<Vec<Record>> for DataSource {
    fn from(records: Vec<Record>) -> Self {
        DataSource::Static(records)
    }
}

impl From<SourcePage> for DataSource {
    fn from(page: SourcePage) -> Self {
        DataSource::Shaped(page)
    }
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Static(records) => f.debug_tuple("Static").field(&records.len()).finish(),
            DataSource::Provider(_) => f.write_str("Provider"),
            DataSource::Remote(url) => f.debug_tuple("Remote").field(url).finish(),
            DataSource::Shaped(page) => f.debug_tuple("Shaped").field(&page.len()).finish(),
        }
    }
}

/// Configuration of one table.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{Column, ColumnType, Record};
/// use datagrid_lib::query::SortConfig;
/// use datagrid_lib::table::{PaginationMode, TableConfig};
///
/// let columns = vec![
///     Column::new("name", "Name").sortable(),
///     Column::new("age", "Age").with_type(ColumnType::Number).sortable(),
/// ];
/// let records = vec![Record::new().set("name", "Alice").set("age", 30)];
///
/// let config = TableConfig::new(columns, records)
///     .with_per_page(25)
///     .with_initial_sort(SortConfig::asc("name"))
///     .with_pagination(PaginationMode::Client);
/// assert_eq!(config.per_page, 25);
/// ```
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Column declarations.
    pub columns: Vec<Column>,
    /// Record source.
    pub data_source: DataSource,
    /// Initial page size.
    ///
    /// Default: 10
    pub per_page: usize,
    /// Whether free-text search is applied.
    ///
    /// Default: true
    pub searchable: bool,
    /// Pagination mode.
    pub pagination: PaginationMode,
    /// Initial filters.
    pub filters: FilterSet,
    /// Relations to embed or resolve.
    pub relations: Vec<RelationConfig>,
    /// Initial sort.
    pub initial_sort: Option<SortConfig>,
    /// Whether rows can be selected.
    pub selectable: bool,
    /// Endpoint for relation lookups (`?table=&id=`).
    pub relation_endpoint: Option<String>,
}

impl TableConfig {
    /// Creates a config with defaults for everything but columns and source.
    pub fn new(columns: Vec<Column>, data_source: impl Into<DataSource>) -> Self {
        Self {
            columns,
            data_source: data_source.into(),
            per_page: 10,
            searchable: true,
            pagination: PaginationMode::default(),
            filters: FilterSet::new(),
            relations: Vec::new(),
            initial_sort: None,
            selectable: false,
            relation_endpoint: None,
        }
    }

    /// Sets the page size.
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    /// Disables free-text search.
    pub fn without_search(mut self) -> Self {
        self.searchable = false;
        self
    }

    /// Sets the pagination mode.
    pub fn with_pagination(mut self, mode: PaginationMode) -> Self {
        self.pagination = mode;
        self
    }

    /// Sets the initial filters.
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the relations.
    pub fn with_relations(mut self, relations: Vec<RelationConfig>) -> Self {
        self.relations = relations;
        self
    }

    /// Sets the initial sort.
    pub fn with_initial_sort(mut self, sort: SortConfig) -> Self {
        self.initial_sort = Some(sort);
        self
    }

    /// Enables row selection.
    pub fn selectable(mut self) -> Self {
        self.selectable = true;
        self
    }

    /// Sets the relation lookup endpoint.
    pub fn with_relation_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.relation_endpoint = Some(endpoint.into());
        self
    }
}
