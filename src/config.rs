//! Downloader configuration
//!
//! The cache root and its size budget are explicit values handed to the
//! downloader, so tests can point them at a temporary directory. Defaults come
//! from the platform cache directory and can be overridden with environment
//! variables:
//!
//! - `SRCFETCH_CACHE_DIR`: cache root (default `<cache dir>/srcfetch/git`)
//! - `SRCFETCH_MAX_CACHE_SIZE`: budget in bytes, `K`/`M`/`G` suffixes allowed

use std::path::PathBuf;

use crate::error::{DownloadError, Result};

/// Environment variable overriding the cache root
pub const CACHE_DIR_ENV: &str = "SRCFETCH_CACHE_DIR";

/// Environment variable overriding the cache budget
pub const MAX_CACHE_SIZE_ENV: &str = "SRCFETCH_MAX_CACHE_SIZE";

/// Default cache directory name under user's cache directory
const CACHE_DIR: &str = "srcfetch";

/// Git mirrors subdirectory within cache
const GIT_DIR: &str = "git";

/// Default total size budget for cached mirrors (500 MiB)
pub const DEFAULT_MAX_CACHE_SIZE: u64 = 500 * 1024 * 1024;

/// Configuration shared by all downloader components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderConfig {
    /// Directory holding one mirror per remote URL
    pub cache_root: PathBuf,
    /// Total bytes mirrors may occupy before eviction
    pub max_cache_size: u64,
}

impl DownloaderConfig {
    /// Create a configuration with an explicit root and budget
    pub fn new(cache_root: impl Into<PathBuf>, max_cache_size: u64) -> Self {
        Self {
            cache_root: cache_root.into(),
            max_cache_size,
        }
    }

    /// Build the configuration from environment variables and platform defaults
    pub fn from_env() -> Result<Self> {
        let cache_root = match std::env::var(CACHE_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_cache_root()?,
        };

        let max_cache_size = match std::env::var(MAX_CACHE_SIZE_ENV) {
            Ok(value) => parse_size(&value)?,
            Err(_) => DEFAULT_MAX_CACHE_SIZE,
        };

        Ok(Self {
            cache_root,
            max_cache_size,
        })
    }

    /// Build the configuration from explicit overrides, falling back to defaults
    ///
    /// Used by the CLI, where clap already folds the environment variables
    /// into the flags.
    pub fn from_overrides(cache_dir: Option<PathBuf>, max_cache_size: Option<&str>) -> Result<Self> {
        let cache_root = match cache_dir {
            Some(dir) => dir,
            None => default_cache_root()?,
        };
        let max_cache_size = match max_cache_size {
            Some(value) => parse_size(value)?,
            None => DEFAULT_MAX_CACHE_SIZE,
        };
        Ok(Self::new(cache_root, max_cache_size))
    }

    /// Replace the cache root
    pub fn with_cache_root(mut self, cache_root: impl Into<PathBuf>) -> Self {
        self.cache_root = cache_root.into();
        self
    }

    /// Replace the size budget
    pub fn with_max_cache_size(mut self, max_cache_size: u64) -> Self {
        self.max_cache_size = max_cache_size;
        self
    }
}

/// Get the default cache root
///
/// Uses the platform's standard cache location (e.g. XDG on Linux, Library/Caches on macOS).
pub fn default_cache_root() -> Result<PathBuf> {
    let base = dirs::cache_dir().ok_or_else(|| DownloadError::ConfigInvalid {
        message: "Could not determine cache directory".to_string(),
    })?;

    Ok(base.join(CACHE_DIR).join(GIT_DIR))
}

/// Parse a size such as `1048576`, `512K`, `500M` or `2G` (binary units)
pub fn parse_size(input: &str) -> Result<u64> {
    let value = input.trim();
    let invalid = || DownloadError::ConfigInvalid {
        message: format!("invalid cache size '{input}', expected bytes or a K/M/G suffix"),
    };

    let (digits, multiplier) = match value.chars().last() {
        Some('k' | 'K') => (&value[..value.len() - 1], 1024),
        Some('m' | 'M') => (&value[..value.len() - 1], 1024 * 1024),
        Some('g' | 'G') => (&value[..value.len() - 1], 1024 * 1024 * 1024),
        Some(_) => (value, 1),
        None => return Err(invalid()),
    };

    digits
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(invalid)
}
