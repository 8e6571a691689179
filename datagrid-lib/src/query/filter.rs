//! Filter types.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::model::Value;

/// Comparison operator of a structured filter.
///
/// Wire names match the query grammar: `=`, `!=`, `>`, `>=`, `<`, `<=`,
/// `contains`, `startsWith`, `endsWith` and `in`. Anything else is kept as
/// [`FilterOp::Other`] and evaluated as strict equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOp {
    /// Equality: `=`
    #[default]
    Eq,
    /// Not equal: `!=`
    Ne,
    /// Greater than: `>`
    Gt,
    /// Greater than or equal: `>=`
    Ge,
    /// Less than: `<`
    Lt,
    /// Less than or equal: `<=`
    Le,
    /// Case-insensitive substring: `contains`
    Contains,
    /// Case-insensitive prefix: `startsWith`
    StartsWith,
    /// Case-insensitive suffix: `endsWith`
    EndsWith,
    /// Case-insensitive membership: `in`
    In,
    /// Unrecognized operator.
    Other(String),
}

impl FilterOp {
    /// Returns the wire name of the operator.
    pub fn as_str(&self) -> &str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Contains => "contains",
            FilterOp::StartsWith => "startsWith",
            FilterOp::EndsWith => "endsWith",
            FilterOp::In => "in",
            FilterOp::Other(op) => op,
        }
    }

    /// Returns `true` for `>`, `>=`, `<` and `<=`.
    pub fn is_relational(&self) -> bool {
        matches!(self, FilterOp::Gt | FilterOp::Ge | FilterOp::Lt | FilterOp::Le)
    }
}

impl From<&str> for FilterOp {
    fn from(s: &str) -> Self {
        match s {
            "=" => FilterOp::Eq,
            "!=" => FilterOp::Ne,
            ">" => FilterOp::Gt,
            ">=" => FilterOp::Ge,
            "<" => FilterOp::Lt,
            "<=" => FilterOp::Le,
            "contains" => FilterOp::Contains,
            "startsWith" => FilterOp::StartsWith,
            "endsWith" => FilterOp::EndsWith,
            "in" => FilterOp::In,
            other => FilterOp::Other(other.to_string()),
        }
    }
}

impl From<String> for FilterOp {
    fn from(s: String) -> Self {
        FilterOp::from(s.as_str())
    }
}

impl From<FilterOp> for String {
    fn from(op: FilterOp) -> Self {
        op.as_str().to_string()
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicate keyed by column.
///
/// The shape is resolved once at the boundary (see [`Filter::from_json`]) so
/// evaluation never has to sniff whether an operand is a bare value or a
/// condition object.
///
/// # Example
///
/// ```
/// use datagrid_lib::query::{Filter, FilterOp, FilterSet};
///
/// let mut filters = FilterSet::new();
/// filters.insert("active".into(), Filter::simple(false));
/// filters.insert(
///     "status".into(),
///     Filter::structured("status", FilterOp::In, vec!["active", "pending"]),
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Bare value, evaluated as `=` against the field named by the filter key.
    Simple(Value),
    /// Operator-tagged condition.
    Structured {
        /// Field to test; the filter key is used when absent.
        field: Option<String>,
        /// Comparison operator.
        operator: FilterOp,
        /// Operand.
        value: Value,
    },
}

/// Mapping from filter key to filter, combined with AND semantics.
pub type FilterSet = BTreeMap<String, Filter>;

impl Filter {
    /// Creates a bare equality filter.
    pub fn simple(value: impl Into<Value>) -> Self {
        Filter::Simple(value.into())
    }

    /// Creates an operator-tagged filter on an explicit field.
    pub fn structured(field: impl Into<String>, operator: FilterOp, value: impl Into<Value>) -> Self {
        Filter::Structured {
            field: Some(field.into()),
            operator,
            value: value.into(),
        }
    }

    /// Resolves a JSON operand into a filter.
    ///
    /// Objects carrying a `value` key become [`Filter::Structured`]; a missing
    /// `operator` defaults to `=`. Everything else is a [`Filter::Simple`].
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(mut map) if map.contains_key("value") => {
                let value = map.remove("value").map(Value::from).unwrap_or_default();
                let field = map
                    .get("field")
                    .and_then(|f| f.as_str())
                    .map(str::to_string);
                let operator = map
                    .get("operator")
                    .and_then(|o| o.as_str())
                    .map(FilterOp::from)
                    .unwrap_or_default();
                Filter::Structured {
                    field,
                    operator,
                    value,
                }
            }
            other => Filter::Simple(Value::from(other)),
        }
    }

    /// Returns the JSON form used on the wire.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Filter::Simple(value) => value.into(),
            Filter::Structured {
                field,
                operator,
                value,
            } => {
                let mut map = serde_json::Map::new();
                if let Some(field) = field {
                    map.insert("field".into(), field.clone().into());
                }
                map.insert("operator".into(), operator.as_str().into());
                map.insert("value".into(), value.into());
                serde_json::Value::Object(map)
            }
        }
    }

    /// Returns the operand.
    pub fn value(&self) -> &Value {
        match self {
            Filter::Simple(value) | Filter::Structured { value, .. } => value,
        }
    }

    /// Returns the operator (`=` for simple filters).
    pub fn operator(&self) -> FilterOp {
        match self {
            Filter::Simple(_) => FilterOp::Eq,
            Filter::Structured { operator, .. } => operator.clone(),
        }
    }

    /// Returns the field this filter tests, given the key it is stored under.
    pub fn field<'a>(&'a self, key: &'a str) -> &'a str {
        match self {
            Filter::Structured {
                field: Some(field), ..
            } => field,
            _ => key,
        }
    }

    /// Returns `false` for no-op filters.
    ///
    /// Null operands, blank strings and empty lists are no-ops. An explicit
    /// `false` (and numeric zero) is a real value.
    pub fn is_active(&self) -> bool {
        match self.value() {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::List(items) => !items.is_empty(),
            _ => true,
        }
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Filter::from_json)
    }
}
