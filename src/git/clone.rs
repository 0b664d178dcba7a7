//! Mirror cloning and fetching
//!
//! A mirror is a bare repository whose `origin` remote maps every remote ref
//! onto the same local ref (`+refs/*:refs/*`), so branches and tags are
//! resolvable locally under their own names.

use std::path::Path;

use git2::{AutotagOption, FetchPrune, Repository, build::RepoBuilder};
use tracing::debug;

use super::auth::fetch_options;
use super::error::interpret_git_error;
use super::url::normalize_for_libgit2;
use crate::error::{Result, cache, git};

/// Refspec mapping every remote ref onto the same local ref
pub const MIRROR_REFSPEC: &str = "+refs/*:refs/*";

/// Clone `url` as a bare mirror into `target`
///
/// `target` must not exist or be an empty directory.
pub fn clone_mirror(url: &str, target: &Path) -> Result<Repository> {
    let mut options = fetch_options();
    options.download_tags(AutotagOption::All);

    let mut builder = RepoBuilder::new();
    builder.bare(true);
    builder.fetch_options(options);
    builder.remote_create(|repo, name, remote_url| {
        repo.remote_with_fetch(name, remote_url, MIRROR_REFSPEC)
    });

    debug!(url, target = %target.display(), "cloning mirror");
    builder
        .clone(&normalize_for_libgit2(url), target)
        .map_err(|e| git::remote_unavailable(url, interpret_git_error(&e)))
}

/// Fetch all refs of a mirror from its `origin` remote, pruning deleted ones
pub fn fetch_mirror(mirror: &Path, url: &str) -> Result<()> {
    let repo = Repository::open_bare(mirror).map_err(|e| {
        cache::operation_failed(format!(
            "Failed to open mirror {}: {}",
            mirror.display(),
            e.message()
        ))
    })?;
    let mut remote = repo.find_remote("origin").map_err(|e| {
        cache::operation_failed(format!(
            "Mirror {} has no origin remote: {}",
            mirror.display(),
            e.message()
        ))
    })?;

    let mut options = fetch_options();
    options.prune(FetchPrune::On);
    options.download_tags(AutotagOption::All);

    debug!(url, mirror = %mirror.display(), "fetching mirror");
    remote
        .fetch(&[MIRROR_REFSPEC], Some(&mut options), None)
        .map_err(|e| git::remote_unavailable(url, interpret_git_error(&e)))?;

    // Follow a renamed default branch when the transport still knows it
    if let Ok(default_branch) = remote.default_branch() {
        if let Some(name) = default_branch.as_str() {
            if let Err(e) = repo.set_head(name) {
                debug!(name, error = %e, "could not move mirror HEAD");
            }
        }
    }

    Ok(())
}

/// Whether `path` holds an intact bare repository
pub fn is_mirror(path: &Path) -> bool {
    Repository::open_bare(path).is_ok_and(|repo| repo.is_bare())
}
