//! The single-value comparator behind every filter.

use std::cmp::Ordering;

use super::coerce::coerce_bool;
use super::coerce::is_date_like;
use super::coerce::is_false_literal;
use super::coerce::is_numeric;
use super::coerce::to_day;
use super::coerce::to_number;
use crate::model::ColumnType;
use crate::model::Value;
use crate::query::FilterOp;
use crate::query::params::is_identifier_key;

/// How a pair of operands is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Number,
    Boolean,
    Date { declared: bool },
    Text,
}

/// Decides whether `item` satisfies `op` against `filter`.
///
/// `declared` is the column's declared type, if any. Without it the type is
/// inferred from the item value. Relation and custom columns are also
/// inferred since their raw values are usually foreign keys.
pub fn compare(item: &Value, filter: &Value, op: &FilterOp, declared: Option<ColumnType>) -> bool {
    compare_values(false, item, filter, op, declared)
}

/// Like [`compare`], for a value read from `field`.
///
/// Equality on identifier fields (`id`, `department_id`, `userId`) compares
/// numerically when both sides are numeric, so `"007"` finds `7`.
pub fn compare_field(
    field: &str,
    item: &Value,
    filter: &Value,
    op: &FilterOp,
    declared: Option<ColumnType>,
) -> bool {
    compare_values(is_identifier_key(field), item, filter, op, declared)
}

fn compare_values(
    identifier: bool,
    item: &Value,
    filter: &Value,
    op: &FilterOp,
    declared: Option<ColumnType>,
) -> bool {
    if item.is_null() {
        if declared == Some(ColumnType::Boolean) && *op == FilterOp::Eq && is_false_literal(filter) {
            return true;
        }
        return *op == FilterOp::Ne && !filter.is_null();
    }

    if *op == FilterOp::Eq && (identifier || mentions_id(item) || mentions_id(filter)) {
        return identifier_eq(item, filter);
    }

    match kind_of(item, declared) {
        Kind::Boolean => compare_bool(item, filter, op),
        Kind::Number if is_value_op(op) => compare_numbers(item, filter, op),
        Kind::Date { declared } if is_value_op(op) => compare_dates(item, filter, op, declared),
        _ => compare_generic(item, filter, op),
    }
}

fn kind_of(item: &Value, declared: Option<ColumnType>) -> Kind {
    match declared {
        Some(ColumnType::Number) => Kind::Number,
        Some(ColumnType::Boolean) => Kind::Boolean,
        Some(ColumnType::Date) => Kind::Date { declared: true },
        Some(ColumnType::Text) => Kind::Text,
        Some(ColumnType::Relation | ColumnType::Custom) | None => match item {
            Value::Int(_) | Value::Float(_) => Kind::Number,
            Value::Bool(_) => Kind::Boolean,
            v if is_date_like(v) => Kind::Date { declared: false },
            _ => Kind::Text,
        },
    }
}

/// Equality and relational operators; text operators fall through to the
/// generic comparison for every kind.
fn is_value_op(op: &FilterOp) -> bool {
    matches!(op, FilterOp::Eq | FilterOp::Ne) || op.is_relational()
}

fn mentions_id(value: &Value) -> bool {
    match value {
        Value::Null | Value::List(_) | Value::Record(_) => false,
        v => v.to_display_string().contains("id"),
    }
}

fn identifier_eq(item: &Value, filter: &Value) -> bool {
    if is_numeric(item) && is_numeric(filter) {
        return to_number(item) == to_number(filter);
    }
    item.to_display_string() == filter.to_display_string()
}

fn relational(ordering: Option<Ordering>, op: &FilterOp) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        FilterOp::Eq => ordering == Ordering::Equal,
        FilterOp::Ne => ordering != Ordering::Equal,
        FilterOp::Gt => ordering == Ordering::Greater,
        FilterOp::Ge => ordering != Ordering::Less,
        FilterOp::Lt => ordering == Ordering::Less,
        FilterOp::Le => ordering != Ordering::Greater,
        _ => false,
    }
}

fn compare_numbers(item: &Value, filter: &Value, op: &FilterOp) -> bool {
    match (to_number(item), to_number(filter)) {
        (Some(a), Some(b)) => relational(a.partial_cmp(&b), op),
        _ => false,
    }
}

fn compare_bool(item: &Value, filter: &Value, op: &FilterOp) -> bool {
    let (a, b) = (coerce_bool(item), coerce_bool(filter));
    match op {
        FilterOp::Eq => a == b,
        FilterOp::Ne => a != b,
        _ => false,
    }
}

fn compare_dates(item: &Value, filter: &Value, op: &FilterOp, declared: bool) -> bool {
    match (to_day(item, declared), to_day(filter, declared)) {
        (Some(a), Some(b)) => relational(Some(a.cmp(&b)), op),
        _ => false,
    }
}

/// Strict equality: same variant and same content. Integers and floats of
/// equal magnitude are equal.
fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        _ => a == b,
    }
}

fn compare_generic(item: &Value, filter: &Value, op: &FilterOp) -> bool {
    match op {
        FilterOp::Eq | FilterOp::Other(_) => strict_eq(item, filter),
        FilterOp::Ne => !strict_eq(item, filter),
        FilterOp::Gt | FilterOp::Ge | FilterOp::Lt | FilterOp::Le => {
            let ordering = match (item, filter) {
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => match (to_number(item), to_number(filter)) {
                    (Some(a), Some(b)) if item.is_number() && filter.is_number() => a.partial_cmp(&b),
                    _ => None,
                },
            };
            relational(ordering, op)
        }
        FilterOp::Contains => lower(item).contains(&lower(filter)),
        FilterOp::StartsWith => lower(item).starts_with(&lower(filter)),
        FilterOp::EndsWith => lower(item).ends_with(&lower(filter)),
        FilterOp::In => {
            let needle = lower(item);
            match filter {
                Value::List(options) => options.iter().any(|option| lower(option) == needle),
                other => lower(other) == needle,
            }
        }
    }
}

fn lower(value: &Value) -> String {
    value.to_display_string().to_lowercase()
}
