//! Mirror cache for remote repositories
//!
//! This module keeps one bare mirror per remote URL under the cache root, so
//! repeated downloads of the same repository skip the network whenever the
//! requested reference is already present locally.
//!
//! ## Cache Structure
//!
//! ```text
//! ~/.cache/srcfetch/git/
//! ├── index.json                       url -> { key, last_used_at }
//! └── <repo-slug>-<url hash>/          bare mirror, all refs
//! ```
//!
//! The total size of all mirrors is kept under a budget by evicting the least
//! recently used mirror first. Only the [`CacheStore`] mutates the cache root.

pub mod entry;
pub mod index;
pub mod paths;
pub mod stats;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

pub use entry::CacheEntry;
pub use index::{CacheIndex, IndexRecord};
pub use stats::CacheStats;

use crate::error::{Result, cache};
use crate::git::GitBackend;

/// Owner of the cache root and every mirror in it
pub struct CacheStore {
    root: PathBuf,
    max_size: u64,
    git: Arc<dyn GitBackend>,
}

impl CacheStore {
    /// Create a store for `root` with a budget of `max_size` bytes
    ///
    /// The root is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>, max_size: u64, git: Arc<dyn GitBackend>) -> Self {
        Self {
            root: root.into(),
            max_size,
            git,
        }
    }

    /// The cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The size budget in bytes
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// The deterministic mirror location for `url`, without touching disk
    pub fn mirror_path(&self, url: &str) -> PathBuf {
        paths::mirror_path(&self.root, url)
    }

    fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .map_err(|e| cache::io_failed("create cache directory", &self.root, &e))
    }

    /// Return the mirror for `url`, cloning it if absent or damaged
    ///
    /// A new mirror is cloned into a staging directory and renamed into place,
    /// so a failed clone never leaves a partial mirror behind.
    pub fn ensure_entry(&self, url: &str) -> Result<CacheEntry> {
        self.ensure_root()?;
        let mut index = CacheIndex::load(&self.root)?;
        let key = paths::cache_key(url);
        let local_path = self.root.join(&key);

        if self.git.is_mirror(&local_path) {
            let last_used_at = match index.get(url) {
                Some(record) => record.last_used_at,
                None => {
                    let record = IndexRecord {
                        key: key.clone(),
                        last_used_at: index.next_timestamp(),
                    };
                    let at = record.last_used_at;
                    index.insert(url, record);
                    index.save(&self.root)?;
                    at
                }
            };
            debug!(url, path = %local_path.display(), "cache hit");
            return Ok(CacheEntry {
                source_url: url.to_string(),
                key,
                local_path,
                last_used_at,
            });
        }

        if local_path.exists() {
            warn!(path = %local_path.display(), "removing damaged mirror");
            fs::remove_dir_all(&local_path)
                .map_err(|e| cache::io_failed("remove damaged mirror", &local_path, &e))?;
        }

        info!(url, "cloning into cache");
        self.clone_staged(url, &local_path)?;

        let record = IndexRecord {
            key: key.clone(),
            last_used_at: index.next_timestamp(),
        };
        let last_used_at = record.last_used_at;
        index.insert(url, record);
        index.save(&self.root)?;

        Ok(CacheEntry {
            source_url: url.to_string(),
            key,
            local_path,
            last_used_at,
        })
    }

    fn clone_staged(&self, url: &str, target: &Path) -> Result<()> {
        let staging = tempfile::Builder::new()
            .prefix(paths::STAGING_PREFIX)
            .tempdir_in(&self.root)
            .map_err(|e| cache::io_failed("create staging directory in", &self.root, &e))?;
        let staged = staging.path().join("mirror");

        self.git.clone_mirror(url, &staged)?;

        let marker = paths::url_marker_path(&staged);
        fs::write(&marker, url).map_err(|e| cache::io_failed("write", &marker, &e))?;
        fs::rename(&staged, target).map_err(|e| cache::io_failed("move mirror to", target, &e))
    }

    /// Fetch all branches and tags for `entry` from its remote
    pub fn refresh_entry(&self, entry: &mut CacheEntry) -> Result<()> {
        info!(url = %entry.source_url, "refreshing cached mirror");
        self.git.fetch(&entry.local_path, &entry.source_url)?;
        self.touch(entry)
    }

    /// Record a successful use of `entry`
    pub fn touch(&self, entry: &mut CacheEntry) -> Result<()> {
        self.ensure_root()?;
        let mut index = CacheIndex::load(&self.root)?;
        let now = index.next_timestamp();
        index.insert(
            &entry.source_url,
            IndexRecord {
                key: entry.key.clone(),
                last_used_at: now,
            },
        );
        index.save(&self.root)?;
        entry.last_used_at = now;
        Ok(())
    }

    /// All entries whose mirror is present on disk, least recently used first
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let index = CacheIndex::load(&self.root)?;
        let mut entries: Vec<CacheEntry> = index
            .entries
            .into_iter()
            .map(|(url, record)| CacheEntry {
                local_path: self.root.join(&record.key),
                source_url: url,
                key: record.key,
                last_used_at: record.last_used_at,
            })
            .filter(|entry| entry.local_path.is_dir())
            .collect();
        entries.sort_by_key(|entry| entry.last_used_at);
        Ok(entries)
    }

    /// Remove least recently used mirrors until the total size fits the budget
    ///
    /// Returns the source URLs of evicted mirrors, oldest first.
    pub fn evict_if_over_budget(&self) -> Result<Vec<String>> {
        let mut sized: Vec<(CacheEntry, u64)> = self
            .entries()?
            .into_iter()
            .map(|entry| {
                let size = entry.size_on_disk();
                (entry, size)
            })
            .collect();
        let mut total: u64 = sized.iter().map(|(_, size)| size).sum();
        if total <= self.max_size {
            return Ok(Vec::new());
        }

        // Oldest last, so pop() yields the next eviction candidate
        sized.reverse();
        let mut index = CacheIndex::load(&self.root)?;
        let mut evicted = Vec::new();

        while total > self.max_size {
            let Some((entry, size)) = sized.pop() else {
                break;
            };
            info!(url = %entry.source_url, size, "evicting cached mirror");
            fs::remove_dir_all(&entry.local_path)
                .map_err(|e| cache::io_failed("remove mirror", &entry.local_path, &e))?;
            index.remove(&entry.source_url);
            total = total.saturating_sub(size);
            evicted.push(entry.source_url);
        }

        index.save(&self.root)?;
        Ok(evicted)
    }

    /// Summary of the cache contents
    pub fn stats(&self) -> Result<CacheStats> {
        let entries = self.entries()?;
        Ok(CacheStats {
            repositories: entries.len(),
            total_size: entries.iter().map(CacheEntry::size_on_disk).sum(),
        })
    }

    /// Remove the mirror for `url`; returns whether one was cached
    pub fn remove(&self, url: &str) -> Result<bool> {
        if !self.root.exists() {
            return Ok(false);
        }
        let mut index = CacheIndex::load(&self.root)?;
        let record = index.remove(url);
        let path = record.as_ref().map_or_else(
            || self.mirror_path(url),
            |record| self.root.join(&record.key),
        );

        let existed = path.is_dir();
        if existed {
            fs::remove_dir_all(&path).map_err(|e| cache::io_failed("remove mirror", &path, &e))?;
        }
        index.save(&self.root)?;
        Ok(existed || record.is_some())
    }

    /// Remove every mirror and the index; the root itself is kept
    ///
    /// Returns the number of mirrors removed.
    pub fn clear(&self) -> Result<usize> {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(cache::io_failed("read cache directory", &self.root, &e)),
        };

        let mut removed = 0;
        for entry in dir.filter_map(std::result::Result::ok) {
            let path = entry.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)
                    .map_err(|e| cache::io_failed("remove mirror", &path, &e))?;
                if !entry.file_name().to_string_lossy().starts_with(paths::STAGING_PREFIX) {
                    removed += 1;
                }
            }
        }

        let index = paths::index_path(&self.root);
        if index.exists() {
            fs::remove_file(&index).map_err(|e| cache::io_failed("remove", &index, &e))?;
        }
        Ok(removed)
    }
}
