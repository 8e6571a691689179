//! Document builders and the export registry.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use super::ExportFormat;
use super::ExportOptions;
use super::format_cell;
use crate::error::ExportError;
use crate::model::Column;
use crate::model::Record;
use crate::relation::RelationLabels;

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    /// File name including extension.
    pub file_name: String,
    /// MIME type of `bytes`.
    pub mime_type: String,
    /// Document content.
    pub bytes: Vec<u8>,
}

impl ExportDocument {
    /// Returns the content as UTF-8 text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Rows and columns handed to a [`DocumentBuilder`].
#[derive(Debug, Clone, Copy)]
pub struct ExportData<'a> {
    /// Rows to render, already searched, filtered and sorted.
    pub rows: &'a [Record],
    /// Columns to render, in order.
    pub columns: &'a [&'a Column],
    /// Relation labels used for relation cells.
    pub labels: Option<&'a RelationLabels>,
}

impl ExportData<'_> {
    /// Returns the header labels.
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    /// Returns the formatted cells of one row.
    pub fn cells(&self, row: &Record) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| format_cell(row.get(&column.key), column, row, self.labels))
            .collect()
    }
}

/// Renders rows into a document of one format.
///
/// CSV is built in. Spreadsheet and PDF builders plug in through
/// [`Exporter::register`].
pub trait DocumentBuilder: Send + Sync {
    /// The format this builder produces.
    fn format(&self) -> ExportFormat;

    /// Renders the document content.
    fn build(&self, data: &ExportData<'_>, options: &ExportOptions) -> Result<Vec<u8>, ExportError>;
}

/// CSV builder: every field quoted, embedded quotes doubled.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvBuilder;

impl DocumentBuilder for CsvBuilder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn build(&self, data: &ExportData<'_>, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(Vec::new());
        if options.include_headers {
            writer.write_record(data.headers())?;
        }
        for row in data.rows {
            writer.write_record(data.cells(row))?;
        }
        Ok(writer.into_inner()?)
    }
}

/// Registry of document builders keyed by format.
#[derive(Clone)]
pub struct Exporter {
    builders: HashMap<ExportFormat, Arc<dyn DocumentBuilder>>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    /// Creates a registry with the CSV builder.
    pub fn new() -> Self {
        let mut exporter = Self {
            builders: HashMap::new(),
        };
        exporter.register(CsvBuilder);
        exporter
    }

    /// Registers a builder, replacing any builder for the same format.
    pub fn register(&mut self, builder: impl DocumentBuilder + 'static) {
        self.builders.insert(builder.format(), Arc::new(builder));
    }

    /// Returns `true` if a builder exists for the format.
    pub fn supports(&self, format: ExportFormat) -> bool {
        self.builders.contains_key(&format)
    }

    /// Renders rows into a document.
    ///
    /// Columns come from `options.columns` (unknown keys are ignored) or,
    /// when unset, every visible column.
    pub fn export(
        &self,
        rows: &[Record],
        columns: &[Column],
        options: &ExportOptions,
        labels: Option<&RelationLabels>,
    ) -> Result<ExportDocument, ExportError> {
        let builder = self
            .builders
            .get(&options.format)
            .ok_or_else(|| ExportError::UnsupportedFormat(options.format.to_string()))?;

        let selected = select_columns(columns, options.columns.as_deref());
        let data = ExportData {
            rows,
            columns: &selected,
            labels,
        };
        let bytes = builder.build(&data, options)?;
        debug!(
            "exported {} rows x {} columns as {}",
            rows.len(),
            selected.len(),
            options.format
        );

        Ok(ExportDocument {
            file_name: options.full_file_name(),
            mime_type: options.format.mime_type().to_string(),
            bytes,
        })
    }
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut formats: Vec<_> = self.builders.keys().map(|f| f.as_str()).collect();
        formats.sort_unstable();
        f.debug_struct("Exporter").field("formats", &formats).finish()
    }
}

fn select_columns<'a>(columns: &'a [Column], keys: Option<&[String]>) -> Vec<&'a Column> {
    match keys {
        Some(keys) => keys
            .iter()
            .filter_map(|key| columns.iter().find(|c| &c.key == key))
            .collect(),
        None => columns.iter().filter(|c| c.visible).collect(),
    }
}
