//! Working copy checkout from a mirror
//!
//! This module handles:
//! - Cloning a working copy from a local mirror
//! - Checking out a specific commit as a detached HEAD
//! - Initializing and updating submodules recursively

use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{AutotagOption, Oid, Repository, SubmoduleUpdateOptions};
use tracing::debug;

use super::auth::fetch_options;
use super::error::interpret_git_error;
use crate::error::{DownloadError, Result, git};

/// Checkout a specific commit in the repository as a detached HEAD
pub fn checkout_commit(repo: &Repository, sha: &str) -> std::result::Result<(), git2::Error> {
    let oid = Oid::from_str(sha)?;
    let commit = repo.find_commit(oid)?;

    repo.set_head_detached(commit.id())?;

    let mut checkout_builder = CheckoutBuilder::new();
    checkout_builder.force();
    repo.checkout_head(Some(&mut checkout_builder))
}

/// Clone a working copy of `mirror` into `workdir` and check out `sha`
///
/// The working copy's `origin` is pointed back at `origin_url` so that
/// relative submodule URLs resolve against the real remote.
pub fn checkout_from_mirror(
    mirror: &Path,
    sha: &str,
    workdir: &Path,
    origin_url: &str,
) -> Result<()> {
    let invariant = |e: git2::Error| git::checkout_invariant(sha, e.message());

    // The clone itself writes no files; the target commit is checked out below
    let mut no_checkout = CheckoutBuilder::new();
    no_checkout.dry_run();

    let mut options = fetch_options();
    options.download_tags(AutotagOption::All);

    let mut builder = RepoBuilder::new();
    builder.with_checkout(no_checkout);
    builder.fetch_options(options);

    debug!(
        mirror = %mirror.display(),
        sha,
        workdir = %workdir.display(),
        "checking out from mirror"
    );
    let repo = builder
        .clone(&mirror.to_string_lossy(), workdir)
        .map_err(invariant)?;

    checkout_commit(&repo, sha).map_err(invariant)?;

    repo.remote_set_url("origin", origin_url)
        .map_err(|e| DownloadError::IoError {
            message: format!(
                "Failed to set origin of {}: {}",
                workdir.display(),
                e.message()
            ),
        })?;

    Ok(())
}

/// Initialize and update all submodules of the working copy, recursively
pub fn update_submodules(workdir: &Path) -> Result<()> {
    let repo = Repository::open(workdir).map_err(|e| DownloadError::Internal {
        message: format!(
            "Checked out working copy {} cannot be opened: {}",
            workdir.display(),
            e.message()
        ),
    })?;
    update_submodules_recursive(&repo)
}

fn update_submodules_recursive(repo: &Repository) -> Result<()> {
    let submodules = repo.submodules().map_err(|e| DownloadError::IoError {
        message: format!("Failed to read submodules: {}", e.message()),
    })?;

    for mut submodule in submodules {
        let name = submodule.name().unwrap_or("<unnamed>").to_string();
        let url = submodule.url().unwrap_or(&name).to_string();
        debug!(submodule = %name, url = %url, "updating submodule");

        let mut options = SubmoduleUpdateOptions::new();
        options.fetch(fetch_options());
        options.allow_fetch(true);

        submodule
            .update(true, Some(&mut options))
            .map_err(|e| git::remote_unavailable(&url, interpret_git_error(&e)))?;

        let sub_repo = submodule.open().map_err(|e| DownloadError::IoError {
            message: format!("Failed to open submodule {name}: {}", e.message()),
        })?;
        update_submodules_recursive(&sub_repo)?;
    }

    Ok(())
}
