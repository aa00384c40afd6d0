//! Service-level error type.

use crate::cache::CacheError;
use rtw_common::config::ConfigError;
use rtw_common::model::ModelError;
use thiserror::Error;

/// Errors raised while running the model service or call runner.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Model lifecycle or binding error.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Output cache error.
    #[error("{0}")]
    Cache(#[from] CacheError),

    /// Socket or thread error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Operation requires `init()` first.
    #[error("Service not initialized")]
    NotInitialized,
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::Io(e.to_string())
    }
}
