//! In-memory table engine answering the HTTP actions.

use std::collections::HashMap;

use log::debug;
use serde_json::json;

use crate::error::ConfigError;
use crate::error::EngineError;
use crate::export::ExportFormat;
use crate::model::Column;
use crate::model::Record;
use crate::model::Value;
use crate::pipeline::process;
use crate::query::QueryRequest;
use crate::query::params::parse_params;
use crate::relation::check_relation_params;

/// Page size used when an export gathers its rows.
const EXPORT_PAGE_SIZE: usize = 1000;

/// Fallback display field for relation options.
const DEFAULT_DISPLAY_FIELD: &str = "name";

/// Server side of the remote protocol, backed by in-memory records.
///
/// Serves the same query parameters the remote adapter sends: `data` runs the
/// pipeline, `relation` looks up a single related entity, `relation-options`
/// lists entities of a related table and `export` summarizes an export.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{Column, Record};
/// use datagrid_lib::server::TableEngine;
///
/// let engine = TableEngine::new(
///     vec![Column::new("name", "Name").sortable()],
///     vec![Record::new().set("name", "Alice")],
/// )
/// .unwrap();
/// let page = engine.handle("data", "page=1&perPage=10").unwrap();
/// assert_eq!(page["pagination"]["total"], 1);
/// ```
#[derive(Debug, Clone)]
pub struct TableEngine {
    columns: Vec<Column>,
    records: Vec<Record>,
    relations: HashMap<String, Vec<Record>>,
}

impl TableEngine {
    /// Creates an engine over `records`.
    pub fn new(columns: Vec<Column>, records: Vec<Record>) -> Result<Self, ConfigError> {
        if columns.is_empty() {
            return Err(ConfigError::MissingColumns);
        }
        Ok(Self {
            columns,
            records,
            relations: HashMap::new(),
        })
    }

    /// Registers the entities of a related table.
    pub fn with_relation_table(mut self, name: impl Into<String>, records: Vec<Record>) -> Self {
        self.relations.insert(name.into(), records);
        self
    }

    /// Returns the column definitions.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the number of rows served.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the engine serves no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Dispatches an action with its raw query string.
    pub fn handle(&self, action: &str, query: &str) -> Result<serde_json::Value, EngineError> {
        debug!("engine action '{}' query '{}'", action, query);
        match action {
            "data" => Ok(self.data(&parse_params(query))),
            "relation" => self.relation(query),
            "relation-options" => self.relation_options(query),
            "export" => self.export(query),
            other => Err(EngineError::bad_request(format!("Unknown action: {}", other))),
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    fn data(&self, request: &QueryRequest) -> serde_json::Value {
        let result = process(self.records.clone(), &self.columns, request);
        let mut rows = result.rows;
        if !request.relations.is_empty() {
            for row in rows.iter_mut() {
                self.embed_relations(row, &request.relations);
            }
        }
        let items: Vec<serde_json::Value> = rows.iter().map(record_to_json).collect();
        json!({
            "items": items,
            "pagination": {
                "page": request.pagination.page,
                "perPage": request.pagination.per_page,
                "total": result.total,
            }
        })
    }

    fn relation(&self, query: &str) -> Result<serde_json::Value, EngineError> {
        let params = QueryParams::parse(query);
        let table = params.get("table").unwrap_or_default();
        let id = params
            .get("id")
            .map(|id| Value::String(id.to_string()))
            .unwrap_or(Value::Null);
        check_relation_params(table, &id)?;

        self.find_entity(table, &id)
            .map(record_to_json)
            .ok_or_else(|| {
                EngineError::not_found(format!(
                    "Relation not found: {}:{}",
                    table,
                    id.to_display_string()
                ))
            })
    }

    fn relation_options(&self, query: &str) -> Result<serde_json::Value, EngineError> {
        let params = QueryParams::parse(query);
        let table = params.get("table").unwrap_or_default();
        if table.trim().is_empty() {
            return Err(ConfigError::missing_relation_parameter("table").into());
        }

        let Some(entities) = self.relation_table(table) else {
            debug!("Unknown relation table requested: {}", table);
            return Ok(json!([]));
        };
        let display_field = self
            .columns
            .iter()
            .filter_map(|column| column.relation.as_ref())
            .find(|relation| same_table(&relation.table, table))
            .map(|relation| relation.display_field.as_str())
            .unwrap_or(DEFAULT_DISPLAY_FIELD);

        let options: Vec<serde_json::Value> = entities
            .iter()
            .map(|entity| {
                json!({
                    "value": serde_json::Value::from(entity.get("id")),
                    "label": entity.get(display_field).to_display_string(),
                })
            })
            .collect();
        Ok(serde_json::Value::Array(options))
    }

    fn export(&self, query: &str) -> Result<serde_json::Value, EngineError> {
        let params = QueryParams::parse(query);
        let format = params.get("format").unwrap_or_default();
        let supported = [ExportFormat::Csv, ExportFormat::Excel, ExportFormat::Pdf];
        if !supported.iter().any(|f| f.as_str() == format) {
            return Err(EngineError::bad_request(format!(
                "Unsupported export format: {}",
                format
            )));
        }

        let mut request = parse_params(query);
        request.pagination.page = 1;
        request.pagination.per_page = EXPORT_PAGE_SIZE;
        let count = process(self.records.clone(), &self.columns, &request).rows.len();

        Ok(json!({
            "success": true,
            "format": format,
            "count": count,
            "message": format!("Export to {} completed successfully", format),
        }))
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// Finds a registered table by exact name, falling back to the
    /// alphabetically first name that matches loosely.
    fn relation_table(&self, table: &str) -> Option<&[Record]> {
        if let Some(records) = self.relations.get(table) {
            return Some(records.as_slice());
        }
        self.relations
            .iter()
            .filter(|(name, _)| same_table(name, table))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, records)| records.as_slice())
    }

    fn find_entity(&self, table: &str, id: &Value) -> Option<&Record> {
        let id = id.to_display_string();
        self.relation_table(table)?
            .iter()
            .find(|entity| entity.get("id").to_display_string() == id)
    }

    /// Embeds the entities of requested relations under their table name.
    fn embed_relations(&self, row: &mut Record, requested: &[String]) {
        for column in &self.columns {
            let Some(relation) = &column.relation else {
                continue;
            };
            let wanted = requested
                .iter()
                .any(|name| same_table(name, &relation.table) || name == &column.key);
            if !wanted || row.get(&relation.table).as_record().is_some() {
                continue;
            }
            let id = row.get(&relation.foreign_key).clone();
            if id.is_null() {
                continue;
            }
            let entity = self.find_entity(&relation.table, &id).cloned();
            row.insert(
                relation.table.clone(),
                entity.map(Value::from).unwrap_or(Value::Null),
            );
        }
    }
}

/// Table names match case-insensitively, singular or plural.
fn same_table(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a == b || a.trim_end_matches('s') == b.trim_end_matches('s')
}

fn record_to_json(record: &Record) -> serde_json::Value {
    serde_json::Value::Object(
        record
            .fields()
            .iter()
            .map(|(key, value)| (key.clone(), serde_json::Value::from(value)))
            .collect(),
    )
}

/// Decoded query string pairs.
struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    fn parse(query: &str) -> Self {
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnType;
    use crate::model::RelationDescriptor;

    fn engine() -> TableEngine {
        let columns = vec![
            Column::new("name", "Name").sortable(),
            Column::new("age", "Age").with_type(ColumnType::Number).sortable(),
            Column::new("department_id", "Department")
                .with_type(ColumnType::Relation)
                .with_relation(RelationDescriptor::new("departments", "name", "department_id")),
        ];
        let records = vec![
            Record::new().set("name", "Alice").set("age", 30).set("department_id", 1),
            Record::new().set("name", "Bob").set("age", 25).set("department_id", 2),
            Record::new().set("name", "Carol").set("age", 41).set("department_id", 1),
        ];
        let departments = vec![
            Record::new().set("id", 1).set("name", "Engineering").set("code", "ENG"),
            Record::new().set("id", 2).set("name", "Marketing").set("code", "MKT"),
        ];
        TableEngine::new(columns, records)
            .unwrap()
            .with_relation_table("departments", departments)
    }

    #[test]
    fn test_new_requires_columns() {
        assert_eq!(
            TableEngine::new(Vec::new(), Vec::new()).unwrap_err(),
            ConfigError::MissingColumns
        );
    }

    #[test]
    fn test_data_paginates_and_sorts() {
        let body = engine()
            .handle("data", "page=1&perPage=2&sort=age:desc")
            .unwrap();
        assert_eq!(body["pagination"]["page"], 1);
        assert_eq!(body["pagination"]["perPage"], 2);
        assert_eq!(body["pagination"]["total"], 3);
        let names: Vec<&str> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Carol", "Alice"]);
    }

    #[test]
    fn test_data_filters_and_searches() {
        let body = engine().handle("data", "filter%5Bage%5D=25").unwrap();
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["items"][0]["name"], "Bob");

        let body = engine().handle("data", "search=CAR").unwrap();
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["items"][0]["name"], "Carol");
    }

    #[test]
    fn test_data_embeds_requested_relations() {
        let body = engine().handle("data", "sort=name:asc&with=departments").unwrap();
        assert_eq!(body["items"][0]["departments"]["name"], "Engineering");
        assert_eq!(body["items"][1]["departments"]["code"], "MKT");

        let body = engine().handle("data", "sort=name:asc").unwrap();
        assert!(body["items"][0].get("departments").is_none());
    }

    #[test]
    fn test_relation_lookup() {
        let body = engine().handle("relation", "table=departments&id=2").unwrap();
        assert_eq!(body["name"], "Marketing");

        let err = engine().handle("relation", "table=departments&id=9").unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.status_message(), "Relation not found: departments:9");
    }

    #[test]
    fn test_relation_missing_parameters() {
        let err = engine().handle("relation", "id=1").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.status_message(), "Missing table parameter");

        let err = engine().handle("relation", "table=departments").unwrap_err();
        assert_eq!(err.status_message(), "Missing id parameter");
    }

    #[test]
    fn test_relation_options() {
        let body = engine().handle("relation-options", "table=department").unwrap();
        assert_eq!(
            body,
            json!([
                {"value": 1, "label": "Engineering"},
                {"value": 2, "label": "Marketing"},
            ])
        );
        assert_eq!(
            engine().handle("relation-options", "table=unknown").unwrap(),
            json!([])
        );
        let err = engine().handle("relation-options", "").unwrap_err();
        assert_eq!(err.status_message(), "Missing table parameter");
    }

    #[test]
    fn test_export_summary() {
        let body = engine()
            .handle("export", "format=csv&filter%5Bdepartment_id%5D=1")
            .unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "format": "csv",
                "count": 2,
                "message": "Export to csv completed successfully",
            })
        );

        let err = engine().handle("export", "format=docx").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.status_message(), "Unsupported export format: docx");
    }

    #[test]
    fn test_unknown_action() {
        let err = engine().handle("delete", "").unwrap_err();
        assert_eq!(err, EngineError::bad_request("Unknown action: delete"));
    }

    #[test]
    fn test_relation_table_prefers_exact_name() {
        let engine = engine()
            .with_relation_table("user", vec![Record::new().set("id", 1).set("name", "singular")])
            .with_relation_table("users", vec![Record::new().set("id", 1).set("name", "plural")]);
        for _ in 0..8 {
            let body = engine.handle("relation", "table=users&id=1").unwrap();
            assert_eq!(body["name"], "plural");
            let body = engine.handle("relation", "table=user&id=1").unwrap();
            assert_eq!(body["name"], "singular");
            let body = engine.handle("relation", "table=Users&id=1").unwrap();
            assert_eq!(body["name"], "singular");
        }
    }

    #[test]
    fn test_same_table() {
        assert!(same_table("departments", "Department"));
        assert!(same_table("users", "users"));
        assert!(!same_table("users", "projects"));
    }
}
