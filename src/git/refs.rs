//! Local reference resolution
//!
//! Resolves a requested reference against a mirror's own objects and refs,
//! without any network access.

use std::path::Path;

use git2::{Commit, Oid, Repository};

use crate::error::{Result, cache};
use crate::source::GitReference;

/// Full length of a hex SHA-1 object id
const FULL_SHA_LEN: usize = 40;

/// Shortest abbreviation accepted for a commit
const MIN_SHA_LEN: usize = 4;

fn looks_like_sha(value: &str) -> bool {
    (MIN_SHA_LEN..=FULL_SHA_LEN).contains(&value.len())
        && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn find_commit_by_sha<'r>(repo: &'r Repository, sha: &str) -> Option<Commit<'r>> {
    if !looks_like_sha(sha) {
        return None;
    }
    if sha.len() == FULL_SHA_LEN {
        let oid = Oid::from_str(sha).ok()?;
        return repo.find_commit(oid).ok();
    }
    repo.find_commit_by_prefix(sha).ok()
}

fn find_commit_by_ref<'r>(repo: &'r Repository, refname: &str) -> Option<Commit<'r>> {
    repo.find_reference(refname).ok()?.peel_to_commit().ok()
}

/// Resolve a reference to a commit in an open repository
pub fn resolve_reference<'r>(repo: &'r Repository, reference: &GitReference) -> Option<Commit<'r>> {
    match reference {
        GitReference::Head => repo.head().ok()?.peel_to_commit().ok(),
        GitReference::Commit(sha) => find_commit_by_sha(repo, sha),
        GitReference::Branch(name) => find_commit_by_ref(repo, &format!("refs/heads/{name}")),
        GitReference::Tag(name) => find_commit_by_ref(repo, &format!("refs/tags/{name}")),
    }
}

/// Resolve a reference in the mirror at `mirror` to a full commit SHA
///
/// Returns `Ok(None)` when the reference is not resolvable from local data.
pub fn resolve_in_mirror(mirror: &Path, reference: &GitReference) -> Result<Option<String>> {
    let repo = Repository::open_bare(mirror).map_err(|e| {
        cache::operation_failed(format!(
            "Failed to open mirror {}: {}",
            mirror.display(),
            e.message()
        ))
    })?;

    Ok(resolve_reference(&repo, reference).map(|commit| commit.id().to_string()))
}
