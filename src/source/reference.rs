//! Git reference requested by a source descriptor

use std::fmt;

/// Reference to check out from a repository
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GitReference {
    /// The remote's default branch tip
    #[default]
    Head,
    /// A commit SHA, full or abbreviated
    Commit(String),
    /// A branch name
    Branch(String),
    /// A tag name
    Tag(String),
}

impl GitReference {
    /// The ref name as the hosting provider understands it in archive URLs
    pub fn archive_name(&self) -> &str {
        match self {
            GitReference::Head => "HEAD",
            GitReference::Commit(name) | GitReference::Branch(name) | GitReference::Tag(name) => {
                name
            }
        }
    }
}

impl fmt::Display for GitReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitReference::Head => write!(f, "HEAD"),
            GitReference::Commit(sha) => write!(f, "commit {sha}"),
            GitReference::Branch(name) => write!(f, "branch {name}"),
            GitReference::Tag(name) => write!(f, "tag {name}"),
        }
    }
}
