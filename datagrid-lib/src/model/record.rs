//! Dynamic table record

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::Value;

static NULL: Value = Value::Null;

/// One row of a table's underlying data.
///
/// Records are open mappings from field name to [`Value`]. Nothing is
/// enforced beyond what the declared columns read; fields outside the
/// declared columns pass through untouched.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{Record, Value};
///
/// let record = Record::new()
///     .set("id", 1)
///     .set("name", "Alice");
///
/// assert_eq!(record.get("name"), &Value::from("Alice"));
/// assert!(record.get("missing").is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the field value, or null when the field is absent.
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&NULL)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Returns the field names in key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Converts a JSON array of objects into records.
///
/// Elements that are not objects are dropped and reported through the
/// returned skip count.
pub fn records_from_json(items: Vec<serde_json::Value>) -> (Vec<Record>, usize) {
    let mut skipped = 0;
    let records = items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::Object(map) => Some(Record::from(map)),
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();
    (records, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_is_null() {
        let record = Record::new().set("a", 1);
        assert!(record.get("b").is_null());
        assert!(!record.contains("b"));
    }

    #[test]
    fn test_records_from_json_skips_scalars() {
        let items = vec![serde_json::json!({"id": 1}), serde_json::json!(5)];
        let (records, skipped) = records_from_json(items);
        assert_eq!(records.len(), 1);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_roundtrip_json_shape() {
        let record: Record = serde_json::from_str(r#"{"id": 2, "name": "Bob"}"#).unwrap();
        assert_eq!(record.get("id"), &Value::Int(2));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":2,"name":"Bob"}"#);
    }
}
