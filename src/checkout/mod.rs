//! Materializing a resolved commit into a destination directory
//!
//! The working copy is always cloned from the local mirror, never from the
//! remote. Mirrors are only read here.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::CacheEntry;
use crate::error::{DownloadError, Result, source};
use crate::git::GitBackend;
use crate::resolver::ResolvedReference;

/// Produces working copies from cache entries
pub struct Checkout {
    git: Arc<dyn GitBackend>,
}

impl Checkout {
    pub fn new(git: Arc<dyn GitBackend>) -> Self {
        Self { git }
    }

    /// Check out `resolved` from the mirror of `entry` into `dest`
    ///
    /// `dest` must be absent or an empty directory.
    ///
    /// # Errors
    ///
    /// Returns `DestinationNotEmpty` if `dest` has content, `Internal` if the
    /// resolved commit cannot be checked out, and `RemoteUnavailable` if a
    /// submodule cannot be fetched.
    pub fn materialize(
        &self,
        entry: &CacheEntry,
        resolved: &ResolvedReference,
        dest: &Path,
    ) -> Result<()> {
        ensure_empty_destination(dest)?;
        let existed = dest.is_dir();
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DownloadError::IoError {
                message: format!("Failed to create {}: {e}", parent.display()),
            })?;
        }

        info!(
            url = %entry.source_url,
            sha = %resolved.commit_sha,
            dest = %dest.display(),
            "checking out"
        );
        let result = self.populate(entry, resolved, dest);
        if result.is_err() {
            discard_partial_checkout(dest, existed);
        }
        result
    }

    fn populate(
        &self,
        entry: &CacheEntry,
        resolved: &ResolvedReference,
        dest: &Path,
    ) -> Result<()> {
        self.git.checkout(
            &entry.local_path,
            &resolved.commit_sha,
            dest,
            &entry.source_url,
        )?;

        if resolved.requires_submodules {
            debug!(dest = %dest.display(), "updating submodules");
            self.git.update_submodules(dest)?;
        }

        Ok(())
    }
}

/// Return `dest` to the state it had before a failed checkout
fn discard_partial_checkout(dest: &Path, existed: bool) {
    let cleaned = match fs::remove_dir_all(dest) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ if existed => fs::create_dir(dest),
        _ => Ok(()),
    };
    if let Err(e) = cleaned {
        warn!(dest = %dest.display(), error = %e, "failed to clean up partial checkout");
    }
}

/// Fail unless `dest` is absent or an empty directory
pub fn ensure_empty_destination(dest: &Path) -> Result<()> {
    match fs::read_dir(dest) {
        Ok(mut dir) => {
            if dir.next().is_some() {
                return Err(source::destination_not_empty(dest));
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(_) if dest.is_file() => Err(source::destination_not_empty(dest)),
        Err(e) => Err(DownloadError::IoError {
            message: format!("Failed to read destination {}: {e}", dest.display()),
        }),
    }
}
