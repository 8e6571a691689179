//! Human-readable labels for relation values.

use std::sync::Arc;

use dashmap::DashMap;

use crate::model::Value;

/// A label store for relation ids, keyed by relation key (usually the
/// foreign-key column, e.g. `department_id`) and id.
///
/// Clones share the same store, so one instance can be handed to several
/// tables on purpose. A fresh [`RelationLabels::new`] is private to whoever
/// owns it.
///
/// # Example
///
/// ```
/// use datagrid_lib::relation::RelationLabels;
///
/// let labels = RelationLabels::new();
/// labels.set_label("department_id", &3.into(), "Engineering");
///
/// let shared = labels.clone();
/// assert_eq!(shared.label("department_id", &"3".into()).as_deref(), Some("Engineering"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RelationLabels {
    store: Arc<DashMap<String, String>>,
}

impl RelationLabels {
    /// Creates an empty label store.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(relation_key: &str, id: &Value) -> String {
        format!("{}:{}", relation_key, id.to_display_string())
    }

    /// Sets the label for an id.
    pub fn set_label(&self, relation_key: &str, id: &Value, label: impl Into<String>) {
        self.store.insert(Self::key(relation_key, id), label.into());
    }

    /// Returns the label for an id, if any.
    pub fn label(&self, relation_key: &str, id: &Value) -> Option<String> {
        self.store
            .get(&Self::key(relation_key, id))
            .map(|entry| entry.value().clone())
    }

    /// Returns `true` if a non-empty label exists for an id.
    pub fn has_label(&self, relation_key: &str, id: &Value) -> bool {
        self.store
            .get(&Self::key(relation_key, id))
            .is_some_and(|entry| !entry.value().is_empty())
    }

    /// Returns the number of stored labels.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no labels are stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Removes every label.
    pub fn clear(&self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_match_by_string_form() {
        let labels = RelationLabels::new();
        labels.set_label("department_id", &Value::Int(1), "Sales");
        assert_eq!(labels.label("department_id", &Value::from("1")), Some("Sales".to_string()));
        assert!(labels.has_label("department_id", &Value::Int(1)));
        assert!(!labels.has_label("manager_id", &Value::Int(1)));
    }

    #[test]
    fn test_empty_label_is_not_a_label() {
        let labels = RelationLabels::new();
        labels.set_label("department_id", &Value::Int(2), "");
        assert!(!labels.has_label("department_id", &Value::Int(2)));
        assert_eq!(labels.label("department_id", &Value::Int(2)).as_deref(), Some(""));
    }

    #[test]
    fn test_separate_stores_do_not_share() {
        let a = RelationLabels::new();
        let b = RelationLabels::new();
        a.set_label("k", &Value::Int(1), "x");
        assert!(b.is_empty());
        assert_eq!(a.clone().len(), 1);
    }
}
