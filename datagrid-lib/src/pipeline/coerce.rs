//! Value coercions shared by the comparator, the sorter and the wire encoder.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;

use crate::model::Value;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Parses a numeric string. Blank and non-numeric strings yield `None`.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Numeric conversion of a value.
///
/// Booleans convert to 1/0, dates to epoch milliseconds, strings are parsed.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) if !f.is_nan() => Some(*f),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => parse_number(s),
        Value::Date(d) => Some(d.timestamp_millis() as f64),
        _ => None,
    }
}

/// Returns `true` if the value is numeric or a numeric string.
pub fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Int(_) | Value::Float(_) => true,
        Value::String(s) => parse_number(s).is_some(),
        _ => false,
    }
}

/// Boolean coercion.
///
/// `true`, the strings `true`/`yes`/`1`/`y` (any case) and the number 1 are
/// true; everything else is false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1" | "y"
        ),
        Value::Int(n) => *n == 1,
        Value::Float(f) => *f == 1.0,
        _ => false,
    }
}

/// Returns `true` for operands that loosely equal `false`.
pub fn is_false_literal(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !*b,
        Value::Int(n) => *n == 0,
        Value::Float(f) => *f == 0.0,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "false" | "0"),
        _ => false,
    }
}

/// Parses a date/time string.
///
/// Accepts RFC 3339 (kept at the wall-clock time as written), ISO
/// `YYYY-MM-DD` with an optional time part, `DD/MM/YYYY` and, when that
/// fails, `MM/DD/YYYY`. Date-only forms resolve to midnight.
pub fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parses a value into an instant.
///
/// When `numeric_as_epoch` is set, numbers are read as epoch milliseconds
/// (used when the column is declared as a date).
pub fn to_instant(value: &Value, numeric_as_epoch: bool) -> Option<NaiveDateTime> {
    match value {
        Value::Date(d) => Some(d.naive_utc()),
        Value::String(s) => parse_datetime_str(s),
        Value::Int(n) if numeric_as_epoch => DateTime::from_timestamp_millis(*n).map(|d| d.naive_utc()),
        Value::Float(f) if numeric_as_epoch && f.is_finite() => {
            DateTime::from_timestamp_millis(*f as i64).map(|d| d.naive_utc())
        }
        _ => None,
    }
}

/// Parses a value into a calendar day (time of day dropped).
pub fn to_day(value: &Value, numeric_as_epoch: bool) -> Option<NaiveDate> {
    to_instant(value, numeric_as_epoch).map(|dt| dt.date())
}

/// Returns `true` if the value is a date or a string that parses as one.
pub fn is_date_like(value: &Value) -> bool {
    match value {
        Value::Date(_) => true,
        Value::String(s) => parse_datetime_str(s).is_some(),
        _ => false,
    }
}
