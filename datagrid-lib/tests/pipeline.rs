//! Integration tests for the local query pipeline.

use datagrid_lib::model::Column;
use datagrid_lib::model::ColumnType;
use datagrid_lib::model::Record;
use datagrid_lib::model::Value;
use datagrid_lib::pipeline::apply_filters;
use datagrid_lib::pipeline::apply_search;
use datagrid_lib::pipeline::apply_sort;
use datagrid_lib::pipeline::compare;
use datagrid_lib::pipeline::paginate;
use datagrid_lib::pipeline::process;
use datagrid_lib::query::Filter;
use datagrid_lib::query::FilterOp;
use datagrid_lib::query::FilterSet;
use datagrid_lib::query::QueryRequest;
use datagrid_lib::query::SortConfig;

fn people() -> Vec<Record> {
    vec![
        Record::new().set("id", 1).set("name", "Alice").set("age", 30),
        Record::new().set("id", 2).set("name", "Bob").set("age", 25),
    ]
}

fn people_columns() -> Vec<Column> {
    vec![
        Column::new("id", "ID").with_type(ColumnType::Number),
        Column::new("name", "Name").sortable(),
        Column::new("age", "Age").with_type(ColumnType::Number).sortable(),
    ]
}

fn names(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.get("name").to_display_string())
        .collect()
}

fn staff() -> Vec<Record> {
    vec![
        Record::new()
            .set("name", "Ann")
            .set("team", "ops")
            .set("status", "active")
            .set("active", true),
        Record::new()
            .set("name", "Ben")
            .set("team", "dev")
            .set("status", "pending")
            .set("active", false),
        Record::new()
            .set("name", "Cid")
            .set("team", "ops")
            .set("status", "terminated")
            .set("active", true),
        Record::new()
            .set("name", "Dee")
            .set("team", "dev")
            .set("status", "active"),
        Record::new()
            .set("name", "Eve")
            .set("team", "ops")
            .set("status", "pending")
            .set("active", false),
    ]
}

fn staff_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Name").sortable(),
        Column::new("team", "Team").sortable(),
        Column::new("status", "Status"),
        Column::new("active", "Active").with_type(ColumnType::Boolean),
    ]
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_sort_by_age_ascending() {
    let sorted = apply_sort(people(), &SortConfig::asc("age"));
    assert_eq!(names(&sorted), vec!["Bob", "Alice"]);
}

#[test]
fn test_search_is_case_insensitive() {
    let found = apply_search(people(), "ali", &people_columns());
    assert_eq!(names(&found), vec!["Alice"]);
}

#[test]
fn test_second_page_of_one() {
    let request = QueryRequest::new(1).page(2);
    let result = process(people(), &people_columns(), &request);
    assert_eq!(result.total, 2);
    assert_eq!(names(&result.rows), vec!["Bob"]);
}

#[test]
fn test_in_filter_excludes_other_values() {
    let mut filters = FilterSet::new();
    filters.insert(
        "status".to_string(),
        Filter::structured("status", FilterOp::In, vec!["active", "pending"]),
    );
    let kept = apply_filters(staff(), &filters, &staff_columns());
    assert_eq!(names(&kept), vec!["Ann", "Ben", "Dee", "Eve"]);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_pagination_is_idempotent() {
    let records = staff();
    for per_page in 1..=4 {
        for page in 1..=4 {
            let once = paginate(&records, page, per_page);
            let again = paginate(once, 1, per_page);
            assert_eq!(once, again, "page {} per_page {}", page, per_page);
        }
    }
}

#[test]
fn test_sort_is_stable() {
    let sorted = apply_sort(staff(), &SortConfig::asc("team"));
    assert_eq!(names(&sorted), vec!["Ben", "Dee", "Ann", "Cid", "Eve"]);

    let sorted = apply_sort(staff(), &SortConfig::desc("team"));
    assert_eq!(names(&sorted), vec!["Ann", "Cid", "Eve", "Ben", "Dee"]);
}

#[test]
fn test_empty_filter_set_is_identity() {
    let kept = apply_filters(staff(), &FilterSet::new(), &staff_columns());
    assert_eq!(kept, staff());
}

#[test]
fn test_disjoint_filters_compose() {
    let columns = staff_columns();
    let mut team = FilterSet::new();
    team.insert("team".to_string(), Filter::simple("ops"));
    let mut status = FilterSet::new();
    status.insert("status".to_string(), Filter::simple("pending"));
    let mut both = team.clone();
    both.extend(status.clone());

    let at_once = apply_filters(staff(), &both, &columns);
    let in_steps = apply_filters(apply_filters(staff(), &team, &columns), &status, &columns);
    assert_eq!(at_once, in_steps);
    assert_eq!(names(&at_once), vec!["Eve"]);
}

#[test]
fn test_nulls_sort_last_both_directions() {
    let records = vec![
        Record::new().set("name", "a").set("score", 2),
        Record::new().set("name", "b"),
        Record::new().set("name", "c").set("score", 1),
        Record::new().set("name", "d").set("score", Value::Null),
    ];
    for sort in [SortConfig::asc("score"), SortConfig::desc("score")] {
        let sorted = apply_sort(records.clone(), &sort);
        let tail: Vec<String> = names(&sorted[2..]);
        assert_eq!(tail, vec!["b", "d"], "{}", sort);
        assert!(sorted[..2].iter().all(|r| !r.get("score").is_null()));
    }
}

#[test]
fn test_explicit_false_filter_is_active() {
    let mut filters = FilterSet::new();
    filters.insert("active".to_string(), Filter::simple(false));
    let kept = apply_filters(staff(), &filters, &staff_columns());
    assert_eq!(names(&kept), vec!["Ben", "Dee", "Eve"]);
}

#[test]
fn test_date_equality_ignores_time_of_day() {
    assert!(compare(
        &Value::from("2024-01-01T08:00:00"),
        &Value::from("2024-01-01"),
        &FilterOp::Eq,
        Some(ColumnType::Date),
    ));
    assert!(!compare(
        &Value::from("2024-01-02T08:00:00"),
        &Value::from("2024-01-01"),
        &FilterOp::Eq,
        Some(ColumnType::Date),
    ));
}

#[test]
fn test_total_counts_before_slicing() {
    let request = QueryRequest::new(2)
        .page(2)
        .sort(SortConfig::asc("name"))
        .filter("team", Filter::simple("ops"));
    let result = process(staff(), &staff_columns(), &request);
    assert_eq!(result.total, 3);
    assert_eq!(names(&result.rows), vec!["Eve"]);
}
