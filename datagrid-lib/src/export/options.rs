//! Export formats and options.

use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ExportError;

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    /// Returns the wire name (`csv`, `excel`, `pdf`).
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Returns the file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Returns the MIME type of documents in this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rows an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportScope {
    /// Every row matching search and filters, in sort order.
    #[default]
    AllRows,
    /// Only the rows of the current page.
    CurrentPage,
}

/// Options of one export.
///
/// # Example
///
/// ```
/// use datagrid_lib::export::{ExportFormat, ExportOptions, ExportScope};
///
/// let options = ExportOptions::new(ExportFormat::Csv)
///     .with_file_name("employees")
///     .with_columns(["name", "age"])
///     .with_delimiter(b';')
///     .with_scope(ExportScope::CurrentPage);
/// assert_eq!(options.full_file_name(), "employees.csv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Output format.
    pub format: ExportFormat,
    /// File name, with or without extension.
    pub file_name: String,
    /// Column keys to export, in order. `None` exports every visible column.
    pub columns: Option<Vec<String>>,
    /// Write a header row of column labels.
    pub include_headers: bool,
    /// Field delimiter for delimited formats.
    pub delimiter: u8,
    /// Rows to export.
    pub scope: ExportScope,
}

impl ExportOptions {
    /// Creates options with defaults for a format.
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            file_name: "export".to_string(),
            columns: None,
            include_headers: true,
            delimiter: b',',
            scope: ExportScope::default(),
        }
    }

    /// Sets the file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Restricts the export to the given column keys.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Omits the header row.
    pub fn without_headers(mut self) -> Self {
        self.include_headers = false;
        self
    }

    /// Sets the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the row scope.
    pub fn with_scope(mut self, scope: ExportScope) -> Self {
        self.scope = scope;
        self
    }

    /// Returns the file name with the format's extension.
    pub fn full_file_name(&self) -> String {
        let extension = self.format.extension();
        let suffix = format!(".{extension}");
        if self.file_name.to_ascii_lowercase().ends_with(&suffix) {
            self.file_name.clone()
        } else {
            format!("{}{}", self.file_name, suffix)
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new(ExportFormat::Csv)
    }
}
