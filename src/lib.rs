//! Track file server - local range-serving daemon for genome browser tracks
//!
//! This crate lets a browser-side visualization client randomly access large
//! local files (alignments, indexes, references) without exposing the
//! filesystem:
//! - Files are registered by path and exposed under an unguessable token
//! - A loopback HTTP daemon starts lazily on first registration
//! - Single-interval `Range` requests with 206 Partial Content
//! - Permissive CORS headers so any origin may fetch registered files

pub mod core;
pub mod logging;
pub mod registry;
pub mod server;

// Re-export commonly used items
pub use crate::core::config::ServerConfig;
pub use crate::core::error::{FileServerError, Result};
pub use crate::core::utils::resolve_path;
pub use crate::registry::{FileRegistry, RegistryError, Token};
pub use crate::server::{
    ensure_server_running, get_server_port, register_file, FileServer, RequestError, ServerError,
};
