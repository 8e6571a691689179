//! Column declarations

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::Record;
use super::Value;

/// Declared data type of a column.
///
/// The type governs comparison semantics everywhere: search scope, filter
/// coercion and sort ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Free text (default).
    #[default]
    Text,
    /// Numeric values.
    Number,
    /// Calendar dates.
    Date,
    /// Booleans.
    Boolean,
    /// Foreign-key reference to another table.
    Relation,
    /// Caller-rendered values.
    Custom,
}

impl ColumnType {
    /// Returns `true` for types excluded from free-text search.
    pub fn is_non_textual(self) -> bool {
        matches!(self, ColumnType::Number | ColumnType::Boolean | ColumnType::Date)
    }
}

/// Foreign-key link from a column to an entity in another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDescriptor {
    /// Name of the related table.
    pub table: String,
    /// Field of the related entity shown to users.
    pub display_field: String,
    /// Field of this record holding the related entity's id.
    pub foreign_key: String,
}

impl RelationDescriptor {
    /// Creates a new relation descriptor.
    pub fn new(
        table: impl Into<String>,
        display_field: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            display_field: display_field.into(),
            foreign_key: foreign_key.into(),
        }
    }
}

/// Custom cell formatter: `(value, row) -> text`.
pub type Formatter = Arc<dyn Fn(&Value, &Record) -> String + Send + Sync>;

/// A declared, named projection of a record field.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{Column, ColumnType};
///
/// let columns = vec![
///     Column::new("name", "Name").sortable(),
///     Column::new("age", "Age").with_type(ColumnType::Number).sortable(),
///     Column::new("active", "Active").with_type(ColumnType::Boolean),
/// ];
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Field identifier.
    pub key: String,
    /// Header label.
    pub label: String,
    /// Declared type.
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    /// Whether the column can be sorted on.
    #[serde(default)]
    pub sortable: bool,
    /// Whether the column takes part in filtering and search.
    #[serde(default = "default_true")]
    pub filterable: bool,
    /// Known values for enum-like columns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    /// Relation descriptor for foreign-key columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationDescriptor>,
    /// Whether the column is shown.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Display width hint, passed through to renderers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    /// Custom cell formatter.
    #[serde(skip)]
    pub format: Option<Formatter>,
}

fn default_true() -> bool {
    true
}

impl Column {
    /// Creates a filterable, unsorted text column.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            column_type: ColumnType::Text,
            sortable: false,
            filterable: true,
            enum_values: Vec::new(),
            relation: None,
            visible: true,
            width: None,
            format: None,
        }
    }

    /// Sets the declared type.
    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    /// Marks the column as sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Excludes the column from filtering and search.
    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Sets the known enum values.
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the column as a relation and sets its type accordingly.
    pub fn with_relation(mut self, relation: RelationDescriptor) -> Self {
        self.column_type = ColumnType::Relation;
        self.relation = Some(relation);
        self
    }

    /// Sets the display width hint.
    pub fn with_width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Hides the column.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Sets a custom cell formatter.
    pub fn with_format<F>(mut self, format: F) -> Self
    where
        F: Fn(&Value, &Record) -> String + Send + Sync + 'static,
    {
        self.format = Some(Arc::new(format));
        self
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("column_type", &self.column_type)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("relation", &self.relation)
            .field("has_format", &self.format.is_some())
            .finish_non_exhaustive()
    }
}

/// Looks up the declared type of a field.
///
/// Returns `None` when no column declares the field, in which case callers
/// fall back to type inference.
pub fn column_type_of(columns: &[Column], field: &str) -> Option<ColumnType> {
    columns
        .iter()
        .find(|c| c.key == field)
        .map(|c| c.column_type)
}

/// Derives columns from the keys of the first record.
///
/// The type of each column follows the first record's value for that key.
pub fn columns_from_records(records: &[Record]) -> Vec<Column> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    first
        .fields()
        .iter()
        .map(|(key, value)| {
            let column_type = match value {
                Value::Int(_) | Value::Float(_) => ColumnType::Number,
                Value::Bool(_) => ColumnType::Boolean,
                Value::Date(_) => ColumnType::Date,
                _ => ColumnType::Text,
            };
            Column::new(key, key).with_type(column_type).sortable()
        })
        .collect()
}
