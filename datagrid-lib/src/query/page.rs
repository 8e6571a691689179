//! Pagination types.

use serde::Deserialize;
use serde::Serialize;

use crate::model::Record;

/// Page position of a table.
///
/// `page` is 1-based. `total` is the row count after search and filtering
/// but before slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-based).
    pub page: usize,
    /// Number of rows per page.
    pub per_page: usize,
    /// Total number of matching rows.
    #[serde(default)]
    pub total: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            total: 0,
        }
    }
}

impl Pagination {
    /// Creates pagination at page 1 with the given page size.
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page,
            ..Self::default()
        }
    }

    /// Returns the offset of the first row of the current page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Returns the number of pages needed for `total` rows.
    pub fn page_count(&self) -> usize {
        if self.per_page == 0 {
            0
        } else {
            self.total.div_ceil(self.per_page)
        }
    }
}

/// Records produced by a data source.
///
/// `total` is only present when the source reports one (an envelope response
/// or a provider that knows its full size).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePage {
    records: Vec<Record>,
    total: Option<usize>,
}

impl SourcePage {
    /// Creates a page without a reported total.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            total: None,
        }
    }

    /// Sets the reported total.
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// Returns the records.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the page and returns the records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Returns the reported total, if any.
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    /// Returns the number of records in this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if this page has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_page_count() {
        let p = Pagination {
            page: 3,
            per_page: 10,
            total: 25,
        };
        assert_eq!(p.offset(), 20);
        assert_eq!(p.page_count(), 3);
        assert_eq!(Pagination { page: 0, ..p }.offset(), 0);
    }

    #[test]
    fn test_serde_camel_case() {
        let json = serde_json::to_value(Pagination::default()).unwrap();
        assert_eq!(json, serde_json::json!({"page": 1, "perPage": 10, "total": 0}));
    }
}
