//! Mutable table state.

use std::sync::Arc;

use crate::model::Record;
use crate::query::FilterSet;
use crate::query::Pagination;
use crate::query::SortConfig;
use crate::relation::RelationCache;

/// Where a table is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Never loaded.
    Idle,
    /// A load is in flight.
    Loading,
    /// The last load succeeded.
    Ready,
    /// The last load failed; see [`TableState::error`].
    Error,
}

/// The mutable session of one table.
///
/// In client mode `items` is the full raw collection; in server mode it is
/// the current page as returned by the source.
#[derive(Debug, Clone)]
pub struct TableState {
    /// Last loaded records.
    pub items: Vec<Record>,
    /// A load is in flight.
    pub loading: bool,
    /// Message of the last failed load.
    pub error: Option<String>,
    /// Page position and post-filter total.
    pub pagination: Pagination,
    /// Active sort.
    pub sort: Option<SortConfig>,
    /// Active filters.
    pub filters: FilterSet,
    /// Free-text search.
    pub search_query: String,
    /// Selected rows.
    pub selected: Vec<Record>,
    /// Relation cache shared by every load of this table.
    pub relations_cache: Arc<RelationCache>,
    /// A load has succeeded at least once.
    pub loaded: bool,
}

impl TableState {
    pub(crate) fn new(pagination: Pagination, relations_cache: Arc<RelationCache>) -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            pagination,
            sort: None,
            filters: FilterSet::new(),
            search_query: String::new(),
            selected: Vec::new(),
            relations_cache,
            loaded: false,
        }
    }

    /// Returns the load phase.
    pub fn phase(&self) -> LoadPhase {
        if self.loading {
            LoadPhase::Loading
        } else if self.error.is_some() {
            LoadPhase::Error
        } else if self.loaded {
            LoadPhase::Ready
        } else {
            LoadPhase::Idle
        }
    }
}
