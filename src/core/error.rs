//! Error types for the track file server
//!
//! Each module owns its own error enum; [`FileServerError`] ties them together
//! for callers that only want one type.

use thiserror::Error;

use crate::registry::RegistryError;
use crate::server::ServerError;

/// Result type alias for file server operations
pub type Result<T> = std::result::Result<T, FileServerError>;

/// Main error type for the track file server
#[derive(Error, Debug)]
pub enum FileServerError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FileServerError {
    /// Whether this error means the registered path is not an existing regular file
    pub fn is_not_found(&self) -> bool {
        matches!(self, FileServerError::Registry(RegistryError::NotFound { .. }))
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config load failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid config value: {field}: {reason}")]
    Invalid { field: String, reason: String },
}
