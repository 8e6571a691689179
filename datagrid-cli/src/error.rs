//! CLI error types

use std::path::PathBuf;

/// Errors surfaced by the `datagrid` binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A file could not be read.
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file did not hold the expected JSON.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A command-line argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Output could not be encoded.
    #[error("Cannot encode output: {0}")]
    Encode(#[source] serde_json::Error),

    /// Binding, serving or writing failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Library error.
    #[error(transparent)]
    Grid(#[from] datagrid_lib::Error),
}

impl CliError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<datagrid_lib::error::ConfigError> for CliError {
    fn from(err: datagrid_lib::error::ConfigError) -> Self {
        Self::Grid(err.into())
    }
}
