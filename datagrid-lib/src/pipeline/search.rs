//! Free-text search across filterable text columns.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Column;
use crate::model::Record;
use crate::model::Value;

static DATE_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{1,2}-\d{1,2}|\d{1,2}/\d{1,2}/\d{4})([ T].*)?$")
        .unwrap_or_else(|e| panic!("invalid date pattern: {e}"))
});

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d+(\.\d+)?$").unwrap_or_else(|e| panic!("invalid numeric pattern: {e}"))
});

/// Returns the columns search looks at: filterable and not numeric,
/// boolean or date typed.
pub fn searchable_columns(columns: &[Column]) -> Vec<&Column> {
    columns
        .iter()
        .filter(|c| c.filterable && !c.column_type.is_non_textual())
        .collect()
}

/// Returns the searchable text of a value, if it has any.
///
/// Dates, numbers, booleans, nested values and strings that look like a
/// date or a number are excluded.
fn searchable_text(value: &Value) -> Option<&str> {
    let Value::String(s) = value else {
        return None;
    };
    let trimmed = s.trim();
    if DATE_LIKE.is_match(trimmed) || NUMERIC.is_match(trimmed) {
        return None;
    }
    Some(s)
}

/// Returns `true` if any searchable column of the record contains `needle`.
///
/// `needle` must already be lowercase.
pub fn matches_search(record: &Record, needle: &str, columns: &[&Column]) -> bool {
    columns.iter().any(|column| {
        searchable_text(record.get(&column.key))
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}

/// Keeps the records where some searchable column contains the query,
/// ignoring case. A blank query keeps everything.
pub fn apply_search(records: Vec<Record>, query: &str, columns: &[Column]) -> Vec<Record> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records;
    }
    let searchable = searchable_columns(columns);
    records
        .into_iter()
        .filter(|record| matches_search(record, &needle, &searchable))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnType;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name"),
            Column::new("city", "City"),
            Column::new("code", "Code"),
            Column::new("age", "Age").with_type(ColumnType::Number),
            Column::new("joined", "Joined").with_type(ColumnType::Date),
            Column::new("secret", "Secret").not_filterable(),
        ]
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new()
                .set("name", "Alice")
                .set("city", "Paris")
                .set("code", "2024-05-01")
                .set("age", 30)
                .set("secret", "hidden"),
            Record::new()
                .set("name", "Bob")
                .set("city", "Lyon")
                .set("code", "1234")
                .set("joined", "2024-05-01"),
        ]
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let out = apply_search(records(), "PAR", &columns());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("name").as_str(), Some("Alice"));
    }

    #[test]
    fn test_blank_query_is_identity() {
        assert_eq!(apply_search(records(), "   ", &columns()), records());
    }

    #[test]
    fn test_skips_dates_and_numbers() {
        assert!(apply_search(records(), "2024", &columns()).is_empty());
        assert!(apply_search(records(), "123", &columns()).is_empty());
        assert!(apply_search(records(), "30", &columns()).is_empty());
    }

    #[test]
    fn test_skips_unfilterable_columns() {
        assert!(apply_search(records(), "hidden", &columns()).is_empty());
    }

    #[test]
    fn test_searchable_columns() {
        let columns = columns();
        let keys: Vec<_> = searchable_columns(&columns).iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["name", "city", "code"]);
    }
}
