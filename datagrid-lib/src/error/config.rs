//! Configuration error types

/// Programmer or configuration mistakes.
///
/// These are raised immediately instead of degrading gracefully. When they
/// cross the HTTP boundary they map to `400 Bad Request`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A table was configured without any columns.
    #[error("Missing column list")]
    MissingColumns,

    /// A relation request is missing a required parameter.
    #[error("Missing {parameter} parameter")]
    MissingRelationParameter {
        /// Name of the missing parameter (`table` or `id`).
        parameter: &'static str,
    },

    /// A configuration value is invalid.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// The offending option.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    /// Creates a missing relation parameter error.
    pub fn missing_relation_parameter(parameter: &'static str) -> Self {
        Self::MissingRelationParameter { parameter }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// HTTP status code used when this error crosses the remote boundary.
    pub fn status_code(&self) -> u16 {
        400
    }
}
