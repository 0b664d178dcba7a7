//! Command implementations for srcfetch CLI

use std::path::PathBuf;

use crate::config::DownloaderConfig;
use crate::error::Result;

pub mod cache;
pub mod completions;
pub mod download;
pub mod version;

/// Global options shared by commands that touch the cache
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub cache_dir: Option<PathBuf>,
    pub max_cache_size: Option<String>,
    pub verbose: u8,
}

impl GlobalOptions {
    /// Downloader configuration from the flags, falling back to defaults
    pub fn config(&self) -> Result<DownloaderConfig> {
        DownloaderConfig::from_overrides(self.cache_dir.clone(), self.max_cache_size.as_deref())
    }
}
