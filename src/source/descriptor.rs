//! Source descriptor
//!
//! This module provides `SourceDescriptor` and the serialized shape used by
//! package specifications: `{ git, commit, branch, tag, submodules, download_only }`.

use serde::{Deserialize, Serialize};

use super::GitReference;
use crate::error::{Result, source};

/// Where a package's source lives and how to fetch it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSourceDescriptor", into = "RawSourceDescriptor")]
pub struct SourceDescriptor {
    /// Repository URL (HTTPS, SSH, git://, file:// or a local path)
    pub url: String,

    /// Reference to check out
    pub reference: GitReference,

    /// Initialize and update submodules after checkout
    pub submodules: bool,

    /// Fetch a snapshot archive instead of cloning (bypasses the cache)
    pub download_only: bool,
}

impl SourceDescriptor {
    /// Create a descriptor for the remote HEAD of `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reference: GitReference::Head,
            submodules: false,
            download_only: false,
        }
    }

    /// Set the reference to a commit
    pub fn with_commit(mut self, sha: impl Into<String>) -> Self {
        self.reference = GitReference::Commit(sha.into());
        self
    }

    /// Set the reference to a branch
    pub fn with_branch(mut self, name: impl Into<String>) -> Self {
        self.reference = GitReference::Branch(name.into());
        self
    }

    /// Set the reference to a tag
    pub fn with_tag(mut self, name: impl Into<String>) -> Self {
        self.reference = GitReference::Tag(name.into());
        self
    }

    /// Request submodule initialization
    pub fn with_submodules(mut self, submodules: bool) -> Self {
        self.submodules = submodules;
        self
    }

    /// Request the archive path
    pub fn with_download_only(mut self, download_only: bool) -> Self {
        self.download_only = download_only;
        self
    }

    /// Build a descriptor from the optional commit/branch/tag fields of a package spec.
    ///
    /// At most one of `commit`, `branch` and `tag` may be set.
    pub fn from_parts(
        url: &str,
        commit: Option<String>,
        branch: Option<String>,
        tag: Option<String>,
    ) -> Result<Self> {
        let url = normalize_url(url)?;

        let reference = match (commit, branch, tag) {
            (None, None, None) => GitReference::Head,
            (Some(sha), None, None) => GitReference::Commit(non_empty("commit", sha)?),
            (None, Some(name), None) => GitReference::Branch(non_empty("branch", name)?),
            (None, None, Some(name)) => GitReference::Tag(non_empty("tag", name)?),
            _ => {
                return Err(source::invalid(format!(
                    "commit, branch and tag are mutually exclusive for {url}"
                )));
            }
        };

        Ok(Self {
            url,
            reference,
            submodules: false,
            download_only: false,
        })
    }

    /// Validate a descriptor built with the builder methods
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(source::invalid("repository URL is empty"));
        }
        match &self.reference {
            GitReference::Head => Ok(()),
            GitReference::Commit(name) => non_empty("commit", name.clone()).map(|_| ()),
            GitReference::Branch(name) => non_empty("branch", name.clone()).map(|_| ()),
            GitReference::Tag(name) => non_empty("tag", name.clone()).map(|_| ()),
        }
    }
}

fn non_empty(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(source::invalid(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Expand GitHub shorthands and trim whitespace.
///
/// `github:author/repo` becomes `https://github.com/author/repo.git`. Anything
/// else is passed through unchanged; the git engine decides if it is reachable.
pub fn normalize_url(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(source::invalid("repository URL is empty"));
    }

    if let Some(rest) = input.strip_prefix("github:") {
        let rest = rest.trim_end_matches(".git");
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(source::invalid(format!(
                "expected github:author/repo, got {input}"
            )));
        }
        return Ok(format!("https://github.com/{rest}.git"));
    }

    Ok(input.to_string())
}

/// Serialized shape of a source descriptor in a package specification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSourceDescriptor {
    #[serde(alias = "url")]
    git: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    submodules: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    download_only: bool,
}

impl TryFrom<RawSourceDescriptor> for SourceDescriptor {
    type Error = crate::error::DownloadError;

    fn try_from(raw: RawSourceDescriptor) -> Result<Self> {
        Ok(Self::from_parts(&raw.git, raw.commit, raw.branch, raw.tag)?
            .with_submodules(raw.submodules)
            .with_download_only(raw.download_only))
    }
}

impl From<SourceDescriptor> for RawSourceDescriptor {
    fn from(descriptor: SourceDescriptor) -> Self {
        let (commit, branch, tag) = match descriptor.reference {
            GitReference::Head => (None, None, None),
            GitReference::Commit(sha) => (Some(sha), None, None),
            GitReference::Branch(name) => (None, Some(name), None),
            GitReference::Tag(name) => (None, None, Some(name)),
        };
        Self {
            git: descriptor.url,
            commit,
            branch,
            tag,
            submodules: descriptor.submodules,
            download_only: descriptor.download_only,
        }
    }
}
