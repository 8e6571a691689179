//! Conjunctive filter evaluation over records.

use super::compare::compare_field;
use crate::model::column_type_of;
use crate::model::Column;
use crate::model::Record;
use crate::query::Filter;
use crate::query::FilterSet;

/// Returns `true` if the record satisfies one filter stored under `key`.
///
/// Inactive filters always match. Equality on identifier fields is numeric
/// when both sides are numeric.
pub fn matches_filter(record: &Record, key: &str, filter: &Filter, columns: &[Column]) -> bool {
    if !filter.is_active() {
        return true;
    }
    let field = filter.field(key);
    compare_field(
        field,
        record.get(field),
        filter.value(),
        &filter.operator(),
        column_type_of(columns, field),
    )
}

/// Returns `true` if the record satisfies every active filter.
pub fn matches_filters(record: &Record, filters: &FilterSet, columns: &[Column]) -> bool {
    filters
        .iter()
        .all(|(key, filter)| matches_filter(record, key, filter, columns))
}

/// Keeps the records matching all active filters, in their original order.
pub fn apply_filters(records: Vec<Record>, filters: &FilterSet, columns: &[Column]) -> Vec<Record> {
    if !filters.values().any(Filter::is_active) {
        return records;
    }
    records
        .into_iter()
        .filter(|record| matches_filters(record, filters, columns))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnType;
    use crate::model::Value;
    use crate::query::FilterOp;

    fn people() -> Vec<Record> {
        vec![
            Record::new().set("name", "Alice").set("age", 30).set("active", true),
            Record::new().set("name", "Bob").set("age", 42).set("active", false),
            Record::new().set("name", "Carol").set("age", 42).set("active", Value::Null),
        ]
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name"),
            Column::new("age", "Age").with_type(ColumnType::Number),
            Column::new("active", "Active").with_type(ColumnType::Boolean),
        ]
    }

    fn names(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.get("name").to_display_string()).collect()
    }

    #[test]
    fn test_simple_filter() {
        let filters = FilterSet::from([("age".to_string(), Filter::simple(42))]);
        let out = apply_filters(people(), &filters, &columns());
        assert_eq!(names(&out), ["Bob", "Carol"]);
    }

    #[test]
    fn test_conjunction() {
        let filters = FilterSet::from([
            ("age".to_string(), Filter::simple(42)),
            ("name".to_string(), Filter::structured("name", FilterOp::StartsWith, "c")),
        ]);
        let out = apply_filters(people(), &filters, &columns());
        assert_eq!(names(&out), ["Carol"]);
    }

    #[test]
    fn test_structured_field_overrides_key() {
        let filters = FilterSet::from([(
            "minimum".to_string(),
            Filter::structured("age", FilterOp::Gt, 35),
        )]);
        let out = apply_filters(people(), &filters, &columns());
        assert_eq!(names(&out), ["Bob", "Carol"]);
    }

    #[test]
    fn test_inactive_filters_are_ignored() {
        let filters = FilterSet::from([
            ("name".to_string(), Filter::simple("")),
            ("age".to_string(), Filter::simple(Value::Null)),
            ("tags".to_string(), Filter::structured("tags", FilterOp::In, Vec::<String>::new())),
        ]);
        let out = apply_filters(people(), &filters, &columns());
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_false_is_an_active_filter() {
        let filters = FilterSet::from([("active".to_string(), Filter::simple(false))]);
        let out = apply_filters(people(), &filters, &columns());
        assert_eq!(names(&out), ["Bob", "Carol"]);
    }

    #[test]
    fn test_identifier_filter_matches_padded_id() {
        let records = vec![
            Record::new().set("name", "Alice").set("department_id", "7"),
            Record::new().set("name", "Bob").set("department_id", 8),
            Record::new().set("name", "Carol").set("department_id", 7),
        ];
        let filters = FilterSet::from([("department_id".to_string(), Filter::simple("007"))]);
        let out = apply_filters(records, &filters, &columns());
        assert_eq!(names(&out), ["Alice", "Carol"]);
    }

    #[test]
    fn test_missing_field_is_null() {
        let filters = FilterSet::from([(
            "team".to_string(),
            Filter::structured("team", FilterOp::Ne, "red"),
        )]);
        let out = apply_filters(people(), &filters, &columns());
        assert_eq!(out.len(), 3);
    }
}
