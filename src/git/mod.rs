//! Git operations for mirroring and checking out sources
//!
//! This module handles:
//! - Cloning remotes into bare mirrors and fetching updates
//! - Resolving commits, branches and tags against a mirror
//! - Checking out a working copy from a mirror, with submodules
//! - Authentication via git's native credential system
//!
//! All git work goes through the [`GitBackend`] trait. The cache, resolver and
//! checkout components only see that verb set, so tests can substitute a
//! counting or failing backend.

pub mod auth;
pub mod checkout;
pub mod clone;
pub mod error;
pub mod refs;
pub mod url;

use std::path::Path;

use crate::error::Result;
use crate::source::GitReference;

/// The version-control verbs the downloader relies on
pub trait GitBackend: Send + Sync {
    /// Clone `url` as a bare mirror into `dest`
    fn clone_mirror(&self, url: &str, dest: &Path) -> Result<()>;

    /// Fetch all refs of the mirror at `mirror` from `url`
    fn fetch(&self, mirror: &Path, url: &str) -> Result<()>;

    /// Resolve `reference` to a full commit SHA using only local data
    fn resolve_ref(&self, mirror: &Path, reference: &GitReference) -> Result<Option<String>>;

    /// Create a working copy of `mirror` at `workdir` checked out at `sha`
    fn checkout(&self, mirror: &Path, sha: &str, workdir: &Path, origin_url: &str) -> Result<()>;

    /// Initialize and update submodules of the working copy at `workdir`
    fn update_submodules(&self, workdir: &Path) -> Result<()>;

    /// Whether `path` holds an intact mirror
    fn is_mirror(&self, path: &Path) -> bool;
}

/// [`GitBackend`] implemented with libgit2
#[derive(Debug, Default, Clone, Copy)]
pub struct LibGit2Backend;

impl GitBackend for LibGit2Backend {
    fn clone_mirror(&self, url: &str, dest: &Path) -> Result<()> {
        clone::clone_mirror(url, dest).map(|_| ())
    }

    fn fetch(&self, mirror: &Path, url: &str) -> Result<()> {
        clone::fetch_mirror(mirror, url)
    }

    fn resolve_ref(&self, mirror: &Path, reference: &GitReference) -> Result<Option<String>> {
        refs::resolve_in_mirror(mirror, reference)
    }

    fn checkout(&self, mirror: &Path, sha: &str, workdir: &Path, origin_url: &str) -> Result<()> {
        checkout::checkout_from_mirror(mirror, sha, workdir, origin_url)
    }

    fn update_submodules(&self, workdir: &Path) -> Result<()> {
        checkout::update_submodules(workdir)
    }

    fn is_mirror(&self, path: &Path) -> bool {
        clone::is_mirror(path)
    }
}
