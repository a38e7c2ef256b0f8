//! Token registry implementation

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rand::Rng;

use super::error::RegistryError;
use crate::core::utils::{format_file_size, short_token};

/// Random bytes per token (rendered as twice as many hex characters)
pub const TOKEN_BYTES: usize = 16;

/// Opaque identifier standing in for a registered path in public URLs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Mint a fresh random token
    fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let bytes: [u8; TOKEN_BYTES] = rng.gen();
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

#[derive(Default)]
struct Entries {
    by_token: HashMap<String, PathBuf>,
    by_path: HashMap<PathBuf, Token>,
}

/// Token → canonical path map, deduplicated by path
///
/// Both directions live behind one lock, held only for the map operation.
/// Filesystem checks happen before the lock is taken.
#[derive(Default)]
pub struct FileRegistry {
    entries: Mutex<Entries>,
}

impl FileRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its token
    ///
    /// Relative paths are resolved against the process working directory.
    /// Registering the same file twice returns the same token.
    pub fn register(&self, path: impl AsRef<Path>) -> Result<Token, RegistryError> {
        let (canonical, size) = Self::canonical_file(path.as_ref())?;

        let mut entries = self.entries.lock();
        if let Some(token) = entries.by_path.get(&canonical) {
            return Ok(token.clone());
        }

        let token = loop {
            let candidate = Token::generate();
            if !entries.by_token.contains_key(candidate.as_str()) {
                break candidate;
            }
        };

        entries
            .by_token
            .insert(token.as_str().to_string(), canonical.clone());
        entries.by_path.insert(canonical, token.clone());
        drop(entries);

        tracing::info!(
            token = short_token(token.as_str()),
            size = %format_file_size(size),
            "Registered {}",
            path.as_ref().display()
        );
        Ok(token)
    }

    /// Resolve a token to its registered path
    pub fn lookup(&self, token: &str) -> Option<PathBuf> {
        self.entries.lock().by_token.get(token).cloned()
    }

    /// Token already assigned to a path, if any
    pub fn token_for(&self, path: impl AsRef<Path>) -> Option<Token> {
        let canonical = fs::canonicalize(path.as_ref()).ok()?;
        self.entries.lock().by_path.get(&canonical).cloned()
    }

    /// Number of registered files
    pub fn len(&self) -> usize {
        self.entries.lock().by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Absolute, canonical form of `path` and its size; `path` must be an
    /// existing regular file
    fn canonical_file(path: &Path) -> Result<(PathBuf, u64), RegistryError> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        let not_found = || RegistryError::NotFound {
            path: absolute.display().to_string(),
        };

        let size = match fs::metadata(&absolute) {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => return Err(not_found()),
        };

        let canonical = fs::canonicalize(&absolute).map_err(|_| not_found())?;
        Ok((canonical, size))
    }
}
