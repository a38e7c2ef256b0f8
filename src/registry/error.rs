//! Registry error types

use thiserror::Error;

/// Registration failure
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
