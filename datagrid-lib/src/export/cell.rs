//! Cell formatting for display and export.

use crate::model::Column;
use crate::model::ColumnType;
use crate::model::Record;
use crate::model::Value;
use crate::pipeline::coerce::coerce_bool;
use crate::pipeline::coerce::to_day;
use crate::relation::RelationLabels;

/// Renders one cell as text.
///
/// A custom column formatter wins. Otherwise null is empty, date columns
/// render as `MM/DD/YYYY`, boolean columns as `Yes`/`No`, and relation
/// columns show the injected label for the id, then the attached entity's
/// display field, then the raw id.
pub fn format_cell(
    value: &Value,
    column: &Column,
    row: &Record,
    labels: Option<&RelationLabels>,
) -> String {
    if let Some(format) = &column.format {
        return format(value, row);
    }

    match column.column_type {
        ColumnType::Boolean => {
            let text = if coerce_bool(value) { "Yes" } else { "No" };
            return text.to_string();
        }
        _ if value.is_null() => return String::new(),
        ColumnType::Date => {
            if let Some(day) = to_day(value, true) {
                return day.format("%m/%d/%Y").to_string();
            }
        }
        ColumnType::Relation => {
            if let Some(label) = relation_label(value, column, row, labels) {
                return label;
            }
        }
        _ => {}
    }
    value.to_display_string()
}

fn relation_label(
    value: &Value,
    column: &Column,
    row: &Record,
    labels: Option<&RelationLabels>,
) -> Option<String> {
    if let Some(label) = labels.and_then(|l| l.label(&column.key, value)) {
        return Some(label);
    }
    let relation = column.relation.as_ref()?;
    let label = row.get(&relation.table).as_record()?.get(&relation.display_field);
    (!label.is_null()).then(|| label.to_display_string())
}
