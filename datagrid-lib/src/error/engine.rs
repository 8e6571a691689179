//! Server-side engine error types

use super::ConfigError;

/// Errors returned by the server-side table engine.
///
/// Each variant maps onto an HTTP status so the engine can answer requests
/// with a structured `{statusCode, statusMessage}` body.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Malformed request (missing parameter, unknown action, bad format).
    #[error("{0}")]
    BadRequest(String),

    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure while handling the request.
    #[error("{0}")]
    Internal(String),
}

impl EngineError {
    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the status message sent back to the caller.
    pub fn status_message(&self) -> &str {
        match self {
            Self::BadRequest(m) | Self::NotFound(m) | Self::Internal(m) => m,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::BadRequest(err.to_string())
    }
}
