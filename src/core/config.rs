//! Configuration module for the track file server
//!
//! Settings are layered: built-in defaults, then an optional TOML/JSON file,
//! then `TRACK_FILE_SERVER_*` environment variables.

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// The daemon only ever binds here
pub const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Default read/write chunk used when streaming file bodies
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "TRACK_FILE_SERVER";

/// Daemon configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to bind on the loopback interface (0 lets the OS choose)
    pub port: u16,

    /// Size of each chunk read from disk and written to the socket
    pub chunk_size: usize,

    /// Name of the background thread that owns the runtime
    pub thread_name: String,

    /// Runtime worker threads (defaults to the number of cores)
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            thread_name: "track-file-server".to_string(),
            worker_threads: None,
        }
    }
}

impl ServerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed port instead of an OS-chosen one
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the streaming chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the number of runtime worker threads
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Load configuration from an optional file plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the daemon cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.worker_threads == Some(0) {
            return Err(ConfigError::Invalid {
                field: "worker_threads".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.thread_name.is_empty() {
            return Err(ConfigError::Invalid {
                field: "thread_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
