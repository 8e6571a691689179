//! Error types

mod api;
mod config;
mod engine;
mod export;

pub use api::*;
pub use config::*;
pub use engine::*;
pub use export::*;

/// Top-level error for table operations.
///
/// Local pipeline stages never produce one of these for data-shape reasons;
/// only the load/remote boundary, configuration checks and export do.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport or payload failure talking to a remote source.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Programmer or configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Export formatting failure.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Server-side engine failure.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Failure reported by a custom data provider.
    #[error("Data provider error: {0}")]
    Provider(String),
}

impl Error {
    /// Creates a data provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Returns the HTTP-style status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(e) => e.status_code(),
            Self::Config(e) => Some(e.status_code()),
            Self::Engine(e) => Some(e.status_code()),
            Self::Export(_) | Self::Provider(_) => None,
        }
    }
}
