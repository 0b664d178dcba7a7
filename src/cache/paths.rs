//! Cache path utilities and constants
//!
//! This module provides the on-disk layout of the cache root:
//!
//! ```text
//! <cache root>/
//! ├── index.json
//! └── <repo-slug>-<hash>/      bare mirror
//!     └── srcfetch-url         original source URL
//! ```

use std::path::{Path, PathBuf};

use crate::git::url::repo_slug;

/// File name of the cache index at the cache root
pub const INDEX_FILE: &str = "index.json";

/// File inside each mirror recording the source URL it was cloned from
pub const URL_MARKER_FILE: &str = "srcfetch-url";

/// Prefix of temporary directories used while cloning a new mirror
pub const STAGING_PREFIX: &str = ".staging-";

/// Number of hex characters of the URL hash kept in a cache key
const KEY_HASH_LEN: usize = 16;

/// Derive the cache key (mirror directory name) for a source URL
///
/// Example: `https://github.com/lukeredpath/libPusher.git` ->
/// `lukeredpath-libPusher-<16 hex chars>`. The hash covers the full URL, so
/// two URLs sharing a readable slug never collide.
pub fn cache_key(url: &str) -> String {
    let hash = blake3::hash(url.as_bytes()).to_hex();
    format!("{}-{}", repo_slug(url), &hash[..KEY_HASH_LEN])
}

/// Path of the mirror for `url` under `root`
pub fn mirror_path(root: &Path, url: &str) -> PathBuf {
    root.join(cache_key(url))
}

/// Path of the cache index under `root`
pub fn index_path(root: &Path) -> PathBuf {
    root.join(INDEX_FILE)
}

/// Path of the URL marker inside a mirror
pub fn url_marker_path(mirror: &Path) -> PathBuf {
    mirror.join(URL_MARKER_FILE)
}
