//! Reference resolution against cached mirrors
//!
//! This module handles:
//! - Resolving commits, branches and tags from local mirror data first
//! - Refreshing a mirror exactly once when a reference is missing
//! - Always refreshing for HEAD, whose target can move on the remote
//!
//! Every successful resolution records a use of the cache entry.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStore};
use crate::error::{Result, git};
use crate::git::GitBackend;
use crate::source::GitReference;

/// A reference pinned to a concrete commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    /// Full hex SHA of the commit, never symbolic
    pub commit_sha: String,
    /// Whether submodules must be populated on checkout
    pub requires_submodules: bool,
}

/// Local-first resolver with a single refresh-and-retry
pub struct ReferenceResolver<'a> {
    store: &'a CacheStore,
    git: Arc<dyn GitBackend>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a CacheStore, git: Arc<dyn GitBackend>) -> Self {
        Self { store, git }
    }

    /// Resolve `reference` against the mirror of `entry`
    ///
    /// HEAD always refreshes the mirror first. Commits, branches and tags are
    /// looked up locally; on a miss the mirror is refreshed once and the lookup
    /// retried once.
    ///
    /// # Errors
    ///
    /// Returns `RemoteUnavailable` if a needed refresh fails and
    /// `ReferenceNotFound` if the reference is still missing after the refresh.
    pub fn resolve(
        &self,
        entry: &mut CacheEntry,
        reference: &GitReference,
        submodules: bool,
    ) -> Result<ResolvedReference> {
        let sha = if *reference == GitReference::Head {
            self.store.refresh_entry(entry)?;
            self.lookup(entry, reference)?
        } else if let Some(sha) = self.lookup(entry, reference)? {
            debug!(url = %entry.source_url, %reference, "resolved from cache");
            Some(sha)
        } else {
            debug!(url = %entry.source_url, %reference, "not in cache, refreshing");
            self.store.refresh_entry(entry)?;
            self.lookup(entry, reference)?
        };

        let Some(commit_sha) = sha else {
            return Err(git::reference_not_found(
                reference.to_string(),
                &entry.source_url,
            ));
        };

        self.store.touch(entry)?;
        Ok(ResolvedReference {
            commit_sha,
            requires_submodules: submodules,
        })
    }

    fn lookup(&self, entry: &CacheEntry, reference: &GitReference) -> Result<Option<String>> {
        self.git.resolve_ref(&entry.local_path, reference)
    }
}
