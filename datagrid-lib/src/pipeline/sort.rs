//! Stable single-key sorting.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use super::coerce::parse_datetime_str;
use super::coerce::parse_number;
use crate::model::Record;
use crate::model::Value;
use crate::query::SortConfig;

/// Compares two strings the way a collating UI would: case-insensitive
/// first, lowercase before uppercase on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| b.cmp(a))
}

/// Type class of a sort key. Mixed columns order by class first so the
/// comparison stays a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum KeyClass {
    Number,
    Date,
    Text,
    Boolean,
    Other,
}

enum SortKey<'a> {
    Number(f64),
    Date(NaiveDateTime),
    Text(&'a str),
    Boolean(bool),
    Other(String),
}

impl SortKey<'_> {
    fn class(&self) -> KeyClass {
        match self {
            SortKey::Number(_) => KeyClass::Number,
            SortKey::Date(_) => KeyClass::Date,
            SortKey::Text(_) => KeyClass::Text,
            SortKey::Boolean(_) => KeyClass::Boolean,
            SortKey::Other(_) => KeyClass::Other,
        }
    }
}

fn sort_key(value: &Value) -> SortKey<'_> {
    match value {
        Value::Int(n) => SortKey::Number(*n as f64),
        Value::Float(f) => SortKey::Number(*f),
        Value::Bool(b) => SortKey::Boolean(*b),
        Value::Date(d) => SortKey::Date(d.naive_utc()),
        Value::String(s) => {
            if let Some(n) = parse_number(s) {
                SortKey::Number(n)
            } else if let Some(dt) = parse_datetime_str(s) {
                SortKey::Date(dt)
            } else {
                SortKey::Text(s)
            }
        }
        other => SortKey::Other(other.to_display_string()),
    }
}

/// Ascending comparison of two non-null sort keys.
///
/// Keys fall into classes ordered numbers, dates, text, booleans, then
/// everything else. Numeric and date-like strings join the number and date
/// classes. Within a class numbers compare numerically, dates as instants,
/// and text by [`locale_cmp`].
pub fn compare_keys(a: &Value, b: &Value) -> Ordering {
    let (x, y) = (sort_key(a), sort_key(b));
    match (&x, &y) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
        (SortKey::Date(x), SortKey::Date(y)) => x.cmp(y),
        (SortKey::Text(x), SortKey::Text(y)) => locale_cmp(x, y),
        (SortKey::Boolean(x), SortKey::Boolean(y)) => x.cmp(y),
        (SortKey::Other(x), SortKey::Other(y)) => locale_cmp(x, y),
        _ => x.class().cmp(&y.class()),
    }
}

/// Ordering of two records under a sort. Null keys go last in both
/// directions.
pub fn compare_records(a: &Record, b: &Record, sort: &SortConfig) -> Ordering {
    let (x, y) = (a.get(&sort.field), b.get(&sort.field));
    match (x.is_null(), y.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => sort.direction.apply(compare_keys(x, y)),
    }
}

/// Sorts records by one field. The sort is stable: records with equal keys
/// keep their relative order.
pub fn apply_sort(mut records: Vec<Record>, sort: &SortConfig) -> Vec<Record> {
    records.sort_by(|a, b| compare_records(a, b, sort));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Record::new().set("n", i as i64).set("v", v))
            .collect()
    }

    fn order(records: &[Record]) -> Vec<i64> {
        records
            .iter()
            .map(|r| match r.get("n") {
                Value::Int(n) => *n,
                _ => -1,
            })
            .collect()
    }

    #[test]
    fn test_numbers_ascending_and_descending() {
        let input = rows(vec![3.into(), 1.5.into(), 2.into()]);
        assert_eq!(order(&apply_sort(input.clone(), &SortConfig::asc("v"))), [1, 2, 0]);
        assert_eq!(order(&apply_sort(input, &SortConfig::desc("v"))), [0, 2, 1]);
    }

    #[test]
    fn test_nulls_last_in_both_directions() {
        let input = rows(vec![Value::Null, 2.into(), 1.into()]);
        assert_eq!(order(&apply_sort(input.clone(), &SortConfig::asc("v"))), [2, 1, 0]);
        assert_eq!(order(&apply_sort(input, &SortConfig::desc("v"))), [1, 2, 0]);
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let input = rows(vec!["b".into(), "a".into(), "b".into(), "a".into()]);
        assert_eq!(order(&apply_sort(input.clone(), &SortConfig::asc("v"))), [1, 3, 0, 2]);
        assert_eq!(order(&apply_sort(input, &SortConfig::desc("v"))), [0, 2, 1, 3]);
    }

    #[test]
    fn test_date_strings_sort_chronologically() {
        let input = rows(vec!["2024-02-01".into(), "15/01/2024".into(), "2023-12-31T10:00:00".into()]);
        assert_eq!(order(&apply_sort(input, &SortConfig::asc("v"))), [2, 1, 0]);
    }

    #[test]
    fn test_strings_ignore_case() {
        let input = rows(vec!["banana".into(), "Apple".into(), "cherry".into()]);
        assert_eq!(order(&apply_sort(input, &SortConfig::asc("v"))), [1, 0, 2]);
    }

    #[test]
    fn test_locale_cmp_tie_break() {
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("A", "b"), Ordering::Less);
        assert_eq!(locale_cmp("x", "x"), Ordering::Equal);
    }

    fn permutations(values: &[Value]) -> Vec<Vec<Value>> {
        if values.len() <= 1 {
            return vec![values.to_vec()];
        }
        let mut out = Vec::new();
        for i in 0..values.len() {
            let mut rest = values.to_vec();
            let head = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head.clone());
                out.push(tail);
            }
        }
        out
    }

    fn sorted_values(values: Vec<Value>) -> Vec<Value> {
        apply_sort(rows(values), &SortConfig::asc("v"))
            .iter()
            .map(|r| r.get("v").clone())
            .collect()
    }

    #[test]
    fn test_numbers_and_numeric_strings_sort_together() {
        let expected: Vec<Value> = vec![2.into(), 10.into(), "15".into()];
        for input in permutations(&expected) {
            assert_eq!(sorted_values(input.clone()), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_mixed_classes_order_in_every_permutation() {
        let expected: Vec<Value> = vec![
            "15".into(),
            "2024-01-15".into(),
            "10/02/2024".into(),
            "apple".into(),
            "Banana".into(),
        ];
        for input in permutations(&expected) {
            assert_eq!(sorted_values(input.clone()), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_compare_keys_is_transitive() {
        let keys: Vec<Value> = vec![
            2.into(),
            10.into(),
            "15".into(),
            "2024-01-15".into(),
            "apple".into(),
            true.into(),
            1.5.into(),
        ];
        for a in &keys {
            for b in &keys {
                for c in &keys {
                    if compare_keys(a, b) == Ordering::Less && compare_keys(b, c) == Ordering::Less {
                        assert_eq!(compare_keys(a, c), Ordering::Less, "{:?} {:?} {:?}", a, b, c);
                    }
                }
            }
        }
    }

    #[test]
    fn test_missing_field_is_null() {
        let input = vec![Record::new().set("n", 0), Record::new().set("n", 1).set("v", "z")];
        assert_eq!(order(&apply_sort(input, &SortConfig::asc("v"))), [1, 0]);
    }
}
