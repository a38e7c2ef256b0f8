//! Core module for the track file server
//!
//! This module contains the pieces shared by the registry and the daemon:
//! - Configuration management
//! - Error types and handling
//! - Utility functions

pub mod config;
pub mod error;
pub mod utils;

// Re-export commonly used items
pub use self::config::{ServerConfig, DEFAULT_CHUNK_SIZE, ENV_PREFIX, LOOPBACK};
pub use self::error::{ConfigError, FileServerError, Result};
pub use self::utils::{format_file_size, resolve_path, short_token};
