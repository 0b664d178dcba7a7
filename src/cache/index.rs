//! Cache index management
//!
//! The index maps each source URL to its mirror key and the time it was last
//! used. It is derivable data: when `index.json` is missing or cannot be
//! parsed, it is rebuilt by scanning the mirrors under the cache root.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::paths::{STAGING_PREFIX, index_path, url_marker_path};
use crate::error::{Result, cache};

/// Single entry in the cache index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexRecord {
    /// Mirror directory name under the cache root
    pub key: String,
    /// Last successful use of the mirror
    pub last_used_at: DateTime<Utc>,
}

/// In-memory view of `index.json`, keyed by source URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheIndex {
    #[serde(default)]
    pub entries: BTreeMap<String, IndexRecord>,
}

impl CacheIndex {
    /// Load the index under `root`, rebuilding it from disk if needed
    pub fn load(root: &Path) -> Result<Self> {
        let path = index_path(root);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Self::rebuild(root);
            }
            Err(e) => return Err(cache::io_failed("read index", &path, &e)),
        };

        match serde_json::from_str(&content) {
            Ok(index) => Ok(index),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache index is corrupt, rebuilding");
                Self::rebuild(root)
            }
        }
    }

    /// Reconstruct the index from the mirrors present under `root`
    ///
    /// Mirrors without a URL marker are skipped. Recency comes from the mirror
    /// directory's modification time.
    pub fn rebuild(root: &Path) -> Result<Self> {
        let mut index = Self::default();
        let dir = match fs::read_dir(root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(index),
            Err(e) => return Err(cache::io_failed("read cache directory", root, &e)),
        };

        for entry in dir.filter_map(std::result::Result::ok) {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if !path.is_dir() || name.starts_with(STAGING_PREFIX) {
                continue;
            }

            let Ok(url) = fs::read_to_string(url_marker_path(&path)) else {
                debug!(path = %path.display(), "skipping directory without url marker");
                continue;
            };
            let last_used_at = entry
                .metadata()
                .and_then(|m| m.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            index.entries.insert(
                url.trim().to_string(),
                IndexRecord {
                    key: name,
                    last_used_at,
                },
            );
        }

        debug!(entries = index.entries.len(), "rebuilt cache index");
        Ok(index)
    }

    /// Persist the index under `root`
    ///
    /// Writes to a temporary file first so a crash never leaves a truncated index.
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = index_path(root);
        let content = serde_json::to_string_pretty(self)?;

        let mut file = tempfile::NamedTempFile::new_in(root)
            .map_err(|e| cache::io_failed("create temporary index in", root, &e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| cache::io_failed("write index", &path, &e))?;
        file.persist(&path)
            .map_err(|e| cache::io_failed("write index", &path, &e.error))?;
        Ok(())
    }

    /// Look up a source URL
    pub fn get(&self, url: &str) -> Option<&IndexRecord> {
        self.entries.get(url)
    }

    /// Insert or replace the record for a source URL
    pub fn insert(&mut self, url: &str, record: IndexRecord) {
        self.entries.insert(url.to_string(), record);
    }

    /// Remove the record for a source URL
    pub fn remove(&mut self, url: &str) -> Option<IndexRecord> {
        self.entries.remove(url)
    }

    /// A timestamp later than every recorded use
    ///
    /// Wall clocks can be coarse, so two uses in quick succession would
    /// otherwise tie and make eviction order ambiguous.
    pub fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.entries.values().map(|r| r.last_used_at).max() {
            Some(latest) if latest >= now => latest + TimeDelta::microseconds(1),
            _ => now,
        }
    }
}
