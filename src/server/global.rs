//! Process-wide default server
//!
//! Most callers only ever need one daemon per process. These functions share a
//! single [`FileServer`], configured from `TRACK_FILE_SERVER_*` environment
//! variables the first time any of them is used.

use std::path::Path;

use lazy_static::lazy_static;

use super::daemon::FileServer;
use super::error::ServerError;
use crate::core::config::ServerConfig;
use crate::core::error::Result;

lazy_static! {
    static ref DEFAULT_SERVER: FileServer = FileServer::new(default_config());
}

fn default_config() -> ServerConfig {
    ServerConfig::load(None).unwrap_or_else(|e| {
        tracing::warn!("Ignoring invalid file server environment: {}", e);
        ServerConfig::default()
    })
}

/// The shared server instance
pub fn default_server() -> &'static FileServer {
    &DEFAULT_SERVER
}

/// Register a local file with the shared server and return its URL
pub fn register_file(path: impl AsRef<Path>) -> Result<String> {
    DEFAULT_SERVER.register_file(path)
}

/// Start the shared server if needed and return its port
pub fn ensure_server_running() -> std::result::Result<u16, ServerError> {
    DEFAULT_SERVER.ensure_running()
}

/// Port of the shared server, if it has been started
pub fn get_server_port() -> Option<u16> {
    DEFAULT_SERVER.port()
}
