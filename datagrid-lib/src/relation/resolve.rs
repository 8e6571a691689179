//! Relation resolution over loaded records.

use log::debug;
use log::warn;
use serde::Deserialize;
use serde::Serialize;

use super::RelationCache;
use super::RelationFetcher;
use super::RelationLabels;
use crate::model::Column;
use crate::model::Record;
use crate::model::RelationDescriptor;
use crate::model::Value;

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    HasOne,
    HasMany,
    #[default]
    BelongsTo,
    BelongsToMany,
}

/// A relation a table may embed or resolve.
///
/// The name is what gets sent in the `with` parameter. A relation column is
/// resolved only if its table matches a configured relation's `name` or
/// `target`.
///
/// `local_key` and `select` shape resolution. `foreign_key`, `kind` and
/// `eager` are carried as-is for serialized table configs and custom
/// [`RelationFetcher`] implementations; resolution itself does not read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationConfig {
    /// Relation name.
    pub name: String,
    /// Target table.
    pub target: String,
    /// Field of the local record holding the related id. Overrides the
    /// column descriptor's foreign key when set.
    #[serde(default)]
    pub local_key: Option<String>,
    /// Key on the related record.
    #[serde(default)]
    pub foreign_key: Option<String>,
    /// Cardinality.
    #[serde(rename = "type", default)]
    pub kind: RelationKind,
    /// Fields of the related entity to keep.
    #[serde(default)]
    pub select: Vec<String>,
    /// Load eagerly.
    #[serde(default)]
    pub eager: bool,
}

impl RelationConfig {
    /// Creates a belongs-to relation.
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            local_key: None,
            foreign_key: None,
            kind: RelationKind::default(),
            select: Vec::new(),
            eager: false,
        }
    }

    /// Sets the cardinality.
    pub fn with_kind(mut self, kind: RelationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the local and foreign keys.
    pub fn with_keys(mut self, local_key: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        self.local_key = Some(local_key.into());
        self.foreign_key = Some(foreign_key.into());
        self
    }

    /// Sets the fields to keep from the related entity.
    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the relation as eager.
    pub fn eager(mut self) -> Self {
        self.eager = true;
        self
    }

    /// Returns `true` if this relation serves `table`.
    pub fn matches(&self, table: &str) -> bool {
        self.name == table || self.target == table
    }

    /// Applies `select` to a related entity.
    pub fn project(&self, entity: Record) -> Record {
        if self.select.is_empty() {
            return entity;
        }
        entity
            .fields()
            .iter()
            .filter(|(key, _)| self.select.iter().any(|s| s == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// Outcome counters of one resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveStats {
    /// Lookups answered by the fetcher.
    pub fetched: usize,
    /// Lookups answered by the cache.
    pub cached: usize,
    /// Records that already carried the related entity.
    pub embedded: usize,
    /// Lookups that failed.
    pub failed: usize,
}

/// Attaches related entities to records.
///
/// For every relation column and record, the foreign key (or the matching
/// relation's `local_key`) is looked up in the cache and, on a miss, fetched
/// one at a time through `fetcher`. The result
/// (including a not-found) is cached and stored under the relation's table
/// name on the record. Records that already carry a non-null value there are
/// left alone. Failures are logged and skipped.
///
/// Without a fetcher only embedded entities and cache hits are attached.
/// When `labels` is given, each resolved entity's display field is recorded
/// as the label of its id under the column key.
pub async fn resolve_relations<F>(
    items: &mut [Record],
    columns: &[Column],
    relations: &[RelationConfig],
    cache: &RelationCache,
    fetcher: Option<&F>,
    labels: Option<&RelationLabels>,
) -> ResolveStats
where
    F: RelationFetcher + ?Sized,
{
    let mut stats = ResolveStats::default();
    if relations.is_empty() {
        return stats;
    }
    let relation_columns: Vec<(&Column, &RelationDescriptor)> = columns
        .iter()
        .filter_map(|column| column.relation.as_ref().map(|relation| (column, relation)))
        .collect();
    if relation_columns.is_empty() {
        return stats;
    }

    for item in items.iter_mut() {
        for (column, relation) in &relation_columns {
            let config = relations.iter().find(|r| r.matches(&relation.table));
            let id_field = config
                .and_then(|c| c.local_key.as_deref())
                .unwrap_or(relation.foreign_key.as_str());
            let id = item.get(id_field).clone();
            if id.is_null() {
                continue;
            }

            if let Some(entity) = item.get(&relation.table).as_record() {
                record_label(labels, column, relation, &id, entity);
                stats.embedded += 1;
                continue;
            }

            let key = RelationCache::key(&relation.table, &id);
            if let Some(entity) = cache.get(&key) {
                attach(item, column, relation, &id, entity, labels);
                stats.cached += 1;
                continue;
            }

            let Some(config) = config else {
                continue;
            };
            let Some(fetcher) = fetcher else {
                continue;
            };

            match fetcher.fetch(&relation.table, &id).await {
                Ok(entity) => {
                    let entity = entity.map(|e| config.project(e));
                    cache.insert(key, entity.clone());
                    attach(item, column, relation, &id, entity, labels);
                    stats.fetched += 1;
                }
                Err(e) => {
                    warn!("Error loading relation {}:{}: {}", relation.table, id, e);
                    stats.failed += 1;
                }
            }
        }
    }

    debug!(
        "resolved relations: {} fetched, {} cached, {} embedded, {} failed",
        stats.fetched, stats.cached, stats.embedded, stats.failed
    );
    stats
}

fn attach(
    item: &mut Record,
    column: &Column,
    relation: &RelationDescriptor,
    id: &Value,
    entity: Option<Record>,
    labels: Option<&RelationLabels>,
) {
    match entity {
        Some(entity) => {
            record_label(labels, column, relation, id, &entity);
            item.insert(relation.table.clone(), entity);
        }
        None => item.insert(relation.table.clone(), Value::Null),
    }
}

fn record_label(
    labels: Option<&RelationLabels>,
    column: &Column,
    relation: &RelationDescriptor,
    id: &Value,
    entity: &Record,
) {
    let Some(labels) = labels else {
        return;
    };
    let label = entity.get(&relation.display_field);
    if !label.is_null() {
        labels.set_label(&column.key, id, label.to_display_string());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::Error;

    struct Departments {
        calls: Mutex<Vec<String>>,
    }

    impl Departments {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RelationFetcher for Departments {
        async fn fetch(&self, table: &str, id: &Value) -> Result<Option<Record>, Error> {
            self.calls.lock().unwrap().push(format!("{table}:{id}"));
            match id.to_display_string().as_str() {
                "1" => Ok(Some(Record::new().set("id", 1).set("name", "Sales").set("budget", 10))),
                "2" => Ok(Some(Record::new().set("id", 2).set("name", "Engineering"))),
                "500" => Err(Error::provider("boom")),
                _ => Ok(None),
            }
        }
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name"),
            Column::new("department_id", "Department").with_relation(RelationDescriptor::new(
                "departments",
                "name",
                "department_id",
            )),
        ]
    }

    fn employees(ids: &[i64]) -> Vec<Record> {
        ids.iter()
            .map(|id| Record::new().set("name", format!("e{id}")).set("department_id", *id))
            .collect()
    }

    #[tokio::test]
    async fn test_resolves_and_caches() {
        let fetcher = Departments::new();
        let cache = RelationCache::new();
        let labels = RelationLabels::new();
        let relations = [RelationConfig::new("departments", "departments")];
        let mut items = employees(&[1, 2, 1]);

        let stats =
            resolve_relations(&mut items, &columns(), &relations, &cache, Some(&fetcher), Some(&labels)).await;

        assert_eq!(stats.fetched, 2);
        assert_eq!(stats.cached, 1);
        assert_eq!(fetcher.calls(), ["departments:1", "departments:2"]);
        assert_eq!(
            items[2].get("departments").as_record().map(|d| d.get("name").clone()),
            Some(Value::from("Sales"))
        );
        assert_eq!(labels.label("department_id", &Value::Int(2)).as_deref(), Some("Engineering"));
    }

    #[tokio::test]
    async fn test_not_found_is_cached_and_errors_are_not() {
        let fetcher = Departments::new();
        let cache = RelationCache::new();
        let relations = [RelationConfig::new("departments", "departments")];
        let mut items = employees(&[7, 500]);

        let stats = resolve_relations(&mut items, &columns(), &relations, &cache, Some(&fetcher), None).await;
        assert_eq!(stats.fetched, 1);
        assert_eq!(stats.failed, 1);
        assert!(items[0].contains("departments"));
        assert!(items[0].get("departments").is_null());
        assert!(!items[1].contains("departments"));

        let mut again = employees(&[7, 500]);
        resolve_relations(&mut again, &columns(), &relations, &cache, Some(&fetcher), None).await;
        assert_eq!(fetcher.calls(), ["departments:7", "departments:500", "departments:500"]);
    }

    #[tokio::test]
    async fn test_skips_null_keys_embedded_and_unconfigured() {
        let fetcher = Departments::new();
        let cache = RelationCache::new();
        let mut items = vec![
            Record::new().set("name", "none").set("department_id", Value::Null),
            Record::new()
                .set("name", "embedded")
                .set("department_id", 2)
                .set("departments", Record::new().set("name", "Engineering")),
        ];

        let relations = [RelationConfig::new("departments", "departments")];
        let stats = resolve_relations(&mut items, &columns(), &relations, &cache, Some(&fetcher), None).await;
        assert_eq!(stats.embedded, 1);
        assert!(fetcher.calls().is_empty());

        let mut items = employees(&[1]);
        let unrelated = [RelationConfig::new("managers", "users")];
        resolve_relations(&mut items, &columns(), &unrelated, &cache, Some(&fetcher), None).await;
        assert!(fetcher.calls().is_empty());
        assert!(!items[0].contains("departments"));
    }

    #[tokio::test]
    async fn test_local_key_overrides_descriptor_key() {
        let fetcher = Departments::new();
        let cache = RelationCache::new();
        let relations = [RelationConfig::new("departments", "departments").with_keys("dept", "id")];
        let mut items = vec![
            Record::new().set("name", "a").set("department_id", 1).set("dept", 2),
            Record::new().set("name", "b").set("department_id", 2),
        ];

        let stats = resolve_relations(&mut items, &columns(), &relations, &cache, Some(&fetcher), None).await;
        assert_eq!(stats.fetched, 1);
        assert_eq!(fetcher.calls(), ["departments:2"]);
        assert_eq!(
            items[0].get("departments").as_record().map(|d| d.get("name").clone()),
            Some(Value::from("Engineering"))
        );
        assert!(!items[1].contains("departments"));
    }

    #[tokio::test]
    async fn test_select_projects_entity() {
        let fetcher = Departments::new();
        let cache = RelationCache::new();
        let relations = [RelationConfig::new("departments", "departments").with_select(["name"])];
        let mut items = employees(&[1]);

        resolve_relations(&mut items, &columns(), &relations, &cache, Some(&fetcher), None).await;
        let dept = items[0].get("departments").as_record().cloned().unwrap();
        assert_eq!(dept.len(), 1);
        assert_eq!(dept.get("name"), &Value::from("Sales"));
    }
}
