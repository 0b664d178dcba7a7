//! Test fixtures and utilities for reducing test setup duplication.
//!
//! This module provides helpers to create source repositories on local disk
//! and a git backend that counts network operations.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{FixtureRepo, CountingBackend};
//!
//! #[test]
//! fn my_test() {
//!     let repo = FixtureRepo::new();
//!     let sha = repo.commit_file("README", "hello", "Initial commit");
//!     let backend = CountingBackend::new();
//!     // ... hand `backend` to a CacheStore and assert on `backend.fetches()`
//! }
//! ```

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use git2::{Commit, Repository, Signature};
use tempfile::TempDir;

use crate::error::Result;
use crate::git::{GitBackend, LibGit2Backend};
use crate::source::GitReference;

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// A non-bare source repository living in its own temp directory
pub struct FixtureRepo {
    #[allow(dead_code)]
    temp: TempDir,
    /// Working directory of the repository
    pub path: PathBuf,
    repo: Repository,
}

impl FixtureRepo {
    /// Create an empty repository
    ///
    /// # Panics
    ///
    /// Panics if the repository cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let temp = create_temp_dir();
        let path = temp.path().join("source");
        let repo = Repository::init(&path).expect("Failed to init git repository");
        Self { temp, path, repo }
    }

    /// URL cloning this repository
    #[must_use]
    pub fn url(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    /// Write `name` with `content` and commit it on the current branch
    ///
    /// # Panics
    ///
    /// Panics if any git operation fails.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> String {
        let file = self.path.join(name);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file, content).expect("Failed to write file");

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        self.commit_index(message)
    }

    /// Commit whatever is currently staged
    ///
    /// # Panics
    ///
    /// Panics if any git operation fails.
    pub fn commit_index(&self, message: &str) -> String {
        let mut index = self.repo.index().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        let parent = self.head_commit();
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
            .to_string()
    }

    fn head_commit(&self) -> Option<Commit<'_>> {
        self.repo.head().ok().and_then(|h| h.peel_to_commit().ok())
    }

    /// SHA of the current HEAD commit
    ///
    /// # Panics
    ///
    /// Panics if the repository has no commits.
    #[must_use]
    pub fn head_sha(&self) -> String {
        self.head_commit().expect("repository has no commits").id().to_string()
    }

    /// Create a branch at HEAD and switch to it
    ///
    /// # Panics
    ///
    /// Panics if any git operation fails.
    pub fn create_branch(&self, name: &str) {
        let head = self.head_commit().expect("repository has no commits");
        self.repo.branch(name, &head, true).unwrap();
        self.switch_branch(name);
    }

    /// Point HEAD at an existing branch and check it out
    ///
    /// # Panics
    ///
    /// Panics if any git operation fails.
    pub fn switch_branch(&self, name: &str) {
        self.repo.set_head(&format!("refs/heads/{name}")).unwrap();
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_head(Some(&mut checkout)).unwrap();
    }

    /// Create a lightweight tag at HEAD
    ///
    /// # Panics
    ///
    /// Panics if any git operation fails.
    pub fn tag(&self, name: &str) {
        let head = self.head_commit().expect("repository has no commits");
        self.repo
            .tag_lightweight(name, head.as_object(), true)
            .unwrap();
    }

    /// Create an annotated tag at HEAD
    ///
    /// # Panics
    ///
    /// Panics if any git operation fails.
    pub fn annotated_tag(&self, name: &str) {
        let head = self.head_commit().expect("repository has no commits");
        let sig = Signature::now("Test", "test@test.com").unwrap();
        self.repo
            .tag(name, head.as_object(), &sig, name, true)
            .unwrap();
    }

    /// Add `submodule` as a submodule at `path` and commit it
    ///
    /// # Panics
    ///
    /// Panics if any git operation fails.
    pub fn add_submodule(&self, submodule: &FixtureRepo, path: &str) -> String {
        let mut sub = self
            .repo
            .submodule(&submodule.url(), Path::new(path), true)
            .unwrap();
        sub.clone(None).unwrap();
        sub.add_finalize().unwrap();
        self.commit_index(&format!("Add submodule {path}"))
    }
}

impl Default for FixtureRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// Git backend that delegates to libgit2 and counts remote operations
#[derive(Default)]
pub struct CountingBackend {
    inner: LibGit2Backend,
    clones: AtomicUsize,
    fetches: AtomicUsize,
}

impl CountingBackend {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of mirror clones performed
    pub fn clones(&self) -> usize {
        self.clones.load(Ordering::SeqCst)
    }

    /// Number of mirror fetches performed
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Total remote operations (clones and fetches)
    pub fn remote_operations(&self) -> usize {
        self.clones() + self.fetches()
    }
}

impl GitBackend for CountingBackend {
    fn clone_mirror(&self, url: &str, dest: &Path) -> Result<()> {
        self.clones.fetch_add(1, Ordering::SeqCst);
        self.inner.clone_mirror(url, dest)
    }

    fn fetch(&self, mirror: &Path, url: &str) -> Result<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(mirror, url)
    }

    fn resolve_ref(&self, mirror: &Path, reference: &GitReference) -> Result<Option<String>> {
        self.inner.resolve_ref(mirror, reference)
    }

    fn checkout(&self, mirror: &Path, sha: &str, workdir: &Path, origin_url: &str) -> Result<()> {
        self.inner.checkout(mirror, sha, workdir, origin_url)
    }

    fn update_submodules(&self, workdir: &Path) -> Result<()> {
        self.inner.update_submodules(workdir)
    }

    fn is_mirror(&self, path: &Path) -> bool {
        self.inner.is_mirror(path)
    }
}
