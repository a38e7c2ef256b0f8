//! Daemon error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Request-time failure, terminated at the HTTP layer
///
/// Responses carry the status code only; nothing about the registry or the
/// filesystem leaks into the body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Unknown token")]
    UnknownToken,

    #[error("Registered file no longer exists")]
    FileVanished,

    #[error("Malformed Range header '{header}'")]
    MalformedRange { header: String },
}

impl RequestError {
    /// HTTP status answering this failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::UnknownToken | RequestError::FileVanished => StatusCode::NOT_FOUND,
            RequestError::MalformedRange { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Check if this error should result in a 404 Not Found response
    pub fn is_not_found(&self) -> bool {
        self.status_code() == StatusCode::NOT_FOUND
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "Request rejected");
        self.status_code().into_response()
    }
}

/// Daemon lifecycle failure
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Server bind failed: {reason}")]
    BindFailed { reason: String },

    #[error("Server runtime failed: {reason}")]
    Runtime { reason: String },

    #[error("Server has been shut down")]
    Stopped,
}
