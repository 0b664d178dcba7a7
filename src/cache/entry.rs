//! Cache entry

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::stats::dir_size;

/// A locally cached mirror of one remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Remote URL the mirror was cloned from; unique across the cache
    pub source_url: String,
    /// Mirror directory name under the cache root
    pub key: String,
    /// Mirror directory
    pub local_path: PathBuf,
    /// Last successful use
    pub last_used_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Bytes the mirror occupies on disk
    pub fn size_on_disk(&self) -> u64 {
        dir_size(&self.local_path)
    }
}
