//! The client pipeline orchestrator.
//!
//! A [`Table`] owns the [`TableState`] of one grid. It resolves its
//! [`DataSource`], runs the local pipeline in client mode or trusts the
//! source in server mode, resolves relations, and recomputes the visible page
//! on demand.
//!
//! All methods take `&self`. State lives behind a lock that is never held
//! across an await, and every load takes a generation number: a load that
//! finishes after a newer one has started is discarded.

mod config;
mod state;

pub use config::*;
pub use state::*;

use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use log::debug;
use log::error;

use crate::error::ConfigError;
use crate::error::Error;
use crate::export::ExportDocument;
use crate::export::ExportOptions;
use crate::export::ExportScope;
use crate::export::Exporter;
use crate::model::Column;
use crate::model::Record;
use crate::model::Value;
use crate::pipeline;
use crate::query::Filter;
use crate::query::FilterSet;
use crate::query::Pagination;
use crate::query::QueryRequest;
use crate::query::SortConfig;
use crate::query::SourcePage;
use crate::relation::HttpRelationFetcher;
use crate::relation::RelationCache;
use crate::relation::RelationFetcher;
use crate::relation::RelationLabels;
use crate::relation::resolve_relations;
use crate::remote::RemoteClient;

pub use crate::relation::RelationConfig;

/// One data table.
///
/// # Example
///
/// ```ignore
/// use datagrid_lib::table::{Table, TableConfig};
///
/// let table = Table::new(TableConfig::new(columns, records))?;
/// table.load().await;
/// table.set_search("ali").await;
/// for row in table.display_items() {
///     println!("{}", table.format_cell(row.get("name"), &columns[0], &row));
/// }
/// ```
pub struct Table {
    config: TableConfig,
    state: RwLock<TableState>,
    generation: AtomicU64,
    remote: Option<RemoteClient>,
    fetcher: Option<Arc<dyn RelationFetcher>>,
    labels: RelationLabels,
    exporter: Exporter,
}

impl Table {
    /// Creates a table.
    ///
    /// Fails when the column list is empty, or when a remote source or
    /// relation endpoint is configured and the HTTP client cannot be built.
    pub fn new(config: TableConfig) -> Result<Self, Error> {
        if config.columns.is_empty() {
            return Err(ConfigError::MissingColumns.into());
        }

        let needs_remote = matches!(config.data_source, DataSource::Remote(_))
            || config.relation_endpoint.is_some();
        let remote = if needs_remote {
            Some(RemoteClient::builder().build()?)
        } else {
            None
        };

        let mut state = TableState::new(
            Pagination::new(config.per_page.max(1)),
            Arc::new(RelationCache::new()),
        );
        state.sort = config.initial_sort.clone();
        state.filters = config.filters.clone();

        Ok(Self {
            config,
            state: RwLock::new(state),
            generation: AtomicU64::new(0),
            remote,
            fetcher: None,
            labels: RelationLabels::new(),
            exporter: Exporter::new(),
        })
    }

    /// Uses a custom remote client for the remote source and relation endpoint.
    pub fn with_remote_client(mut self, client: RemoteClient) -> Self {
        self.remote = Some(client);
        self
    }

    /// Uses a custom relation fetcher instead of the relation endpoint.
    pub fn with_relation_fetcher(mut self, fetcher: impl RelationFetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Shares a label store with this table.
    pub fn with_labels(mut self, labels: RelationLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Shares a relation cache with this table.
    pub fn with_relation_cache(self, cache: Arc<RelationCache>) -> Self {
        self.write().relations_cache = cache;
        self
    }

    /// Uses a custom export registry.
    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Returns the columns.
    pub fn columns(&self) -> &[Column] {
        &self.config.columns
    }

    /// Returns the label store.
    pub fn labels(&self) -> &RelationLabels {
        &self.labels
    }

    /// Returns a snapshot of the state.
    pub fn state(&self) -> TableState {
        self.read().clone()
    }

    /// Returns the query the current state describes.
    pub fn query(&self) -> QueryRequest {
        self.request_from(&self.read())
    }

    fn read(&self) -> RwLockReadGuard<'_, TableState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TableState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn request_from(&self, state: &TableState) -> QueryRequest {
        QueryRequest {
            pagination: Pagination {
                total: 0,
                ..state.pagination
            },
            sort: state.sort.clone(),
            filters: state.filters.clone(),
            search: if self.config.searchable {
                state.search_query.clone()
            } else {
                String::new()
            },
            relations: self.config.relations.iter().map(|r| r.name.clone()).collect(),
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn relation_fetcher(&self) -> Option<Arc<dyn RelationFetcher>> {
        if let Some(fetcher) = &self.fetcher {
            return Some(fetcher.clone());
        }
        match (&self.config.relation_endpoint, &self.remote) {
            (Some(endpoint), Some(client)) => Some(Arc::new(HttpRelationFetcher::new(
                client.clone(),
                endpoint.clone(),
            ))),
            _ => None,
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads records from the data source.
    ///
    /// Failures are recorded in [`TableState::error`] and leave the previous
    /// items in place. A load superseded by a newer one never writes state.
    pub async fn load(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let request = {
            let mut state = self.write();
            state.loading = true;
            state.error = None;
            self.request_from(&state)
        };
        let _guard = LoadingGuard {
            table: self,
            generation,
        };

        let result = self.fetch_items(&request).await;
        if !self.is_current(generation) {
            debug!("Discarding stale load (generation {})", generation);
            return;
        }

        let mut state = self.write();
        match result {
            Ok((items, total)) => {
                state.items = items;
                state.pagination.total = total;
                state.loaded = true;
            }
            Err(e) => {
                error!("Error loading data: {}", e);
                state.error = Some(e.to_string());
            }
        }
    }

    async fn fetch_items(&self, request: &QueryRequest) -> Result<(Vec<Record>, usize), Error> {
        let page = match &self.config.data_source {
            DataSource::Static(records) => SourcePage::new(records.clone()),
            DataSource::Shaped(page) => page.clone(),
            DataSource::Provider(provider) => provider.fetch(request).await?,
            DataSource::Remote(url) => {
                let client = self.remote.as_ref().ok_or_else(|| {
                    ConfigError::invalid_value("data_source", "remote source without a client")
                })?;
                client.fetch_page(url, request, &self.config.columns).await?
            }
        };

        let reported = page.total();
        let mut items = page.into_records();
        let total = match self.config.pagination {
            PaginationMode::Client => pipeline::count_matching(&items, &self.config.columns, request),
            PaginationMode::Server => reported.unwrap_or(items.len()),
        };

        if !self.config.relations.is_empty() {
            let cache = self.read().relations_cache.clone();
            let fetcher = self.relation_fetcher();
            resolve_relations(
                &mut items,
                &self.config.columns,
                &self.config.relations,
                &cache,
                fetcher.as_deref(),
                Some(&self.labels),
            )
            .await;
        }

        Ok((items, total))
    }

    async fn reload_if_server(&self) {
        if self.config.pagination == PaginationMode::Server {
            self.load().await;
        }
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Moves to a page (pages below 1 become 1).
    pub async fn set_page(&self, page: usize) {
        self.write().pagination.page = page.max(1);
        self.reload_if_server().await;
    }

    /// Changes the page size and returns to page 1.
    pub async fn set_page_size(&self, per_page: usize) {
        {
            let mut state = self.write();
            state.pagination.per_page = per_page.max(1);
            state.pagination.page = 1;
        }
        self.reload_if_server().await;
    }

    /// Sets the sort.
    pub async fn set_sort(&self, sort: SortConfig) {
        self.write().sort = Some(sort);
        self.reload_if_server().await;
    }

    /// Removes the sort.
    pub async fn clear_sort(&self) {
        self.write().sort = None;
        self.reload_if_server().await;
    }

    /// Sets the search text and returns to page 1.
    pub async fn set_search(&self, query: impl Into<String>) {
        {
            let mut state = self.write();
            state.search_query = query.into();
            state.pagination.page = 1;
        }
        self.reload_if_server().await;
    }

    /// Replaces the filters and returns to page 1.
    pub async fn set_filters(&self, filters: FilterSet) {
        {
            let mut state = self.write();
            state.filters = filters;
            state.pagination.page = 1;
        }
        self.reload_if_server().await;
    }

    /// Sets or replaces one filter and returns to page 1.
    pub async fn set_filter(&self, key: impl Into<String>, filter: Filter) {
        {
            let mut state = self.write();
            state.filters.insert(key.into(), filter);
            state.pagination.page = 1;
        }
        self.reload_if_server().await;
    }

    /// Sets the selected rows.
    pub fn set_selected(&self, selected: Vec<Record>) {
        if !self.config.selectable {
            debug!("Selecting rows on a table without selection enabled");
        }
        self.write().selected = selected;
    }

    // =========================================================================
    // Display
    // =========================================================================

    /// Returns the rows to render.
    ///
    /// In server mode these are the loaded items as-is. In client mode the
    /// pipeline runs over the full collection on every call and the total is
    /// updated.
    pub fn display_items(&self) -> Vec<Record> {
        let mut state = self.write();
        match self.config.pagination {
            PaginationMode::Server => state.items.clone(),
            PaginationMode::Client => {
                let request = self.request_from(&state);
                let result = pipeline::process(state.items.clone(), &self.config.columns, &request);
                state.pagination.total = result.total;
                result.rows
            }
        }
    }

    /// Returns every row matching search and filters, in sort order.
    ///
    /// In server mode only the loaded page is available.
    pub fn matching_items(&self) -> Vec<Record> {
        let state = self.read();
        match self.config.pagination {
            PaginationMode::Server => state.items.clone(),
            PaginationMode::Client => {
                let request = self.request_from(&state);
                pipeline::prepare(state.items.clone(), &self.config.columns, &request)
            }
        }
    }

    /// Renders one cell with this table's label store.
    pub fn format_cell(&self, value: &Value, column: &Column, row: &Record) -> String {
        crate::export::format_cell(value, column, row, Some(&self.labels))
    }

    /// Exports rows per `options.scope`.
    pub fn export(&self, options: &ExportOptions) -> Result<ExportDocument, Error> {
        let rows = match options.scope {
            ExportScope::AllRows => self.matching_items(),
            ExportScope::CurrentPage => self.display_items(),
        };
        Ok(self
            .exporter
            .export(&rows, &self.config.columns, options, Some(&self.labels))?)
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("config", &self.config)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Clears `loading` when the load that set it ends, however it ends.
struct LoadingGuard<'a> {
    table: &'a Table,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.table.is_current(self.generation) {
            self.table.write().loading = false;
        }
    }
}
