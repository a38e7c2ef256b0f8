//! Utility functions for the track file server
//!
//! Common helper functions used throughout the crate.

use std::path::{Path, PathBuf};

/// Resolve `path` against `anchor` unless it is already absolute
///
/// Relative track paths are usually written relative to the program that
/// declares them rather than the process working directory.
pub fn resolve_path(path: impl AsRef<Path>, anchor: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        anchor.as_ref().join(path)
    }
}

/// Resolve a relative path against the calling crate's manifest directory
#[macro_export]
macro_rules! resolve_path {
    ($path:expr) => {
        $crate::core::utils::resolve_path($path, ::std::env!("CARGO_MANIFEST_DIR"))
    };
}

/// Abbreviate a token for log output
pub fn short_token(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

/// Format file size for display
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
