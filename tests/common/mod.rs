//! Common test utilities for srcfetch integration tests

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use git2::{Repository, Signature};
use tempfile::TempDir;

/// A source repository on local disk that downloads can clone from
#[allow(dead_code)]
pub struct SourceRepo {
    #[allow(dead_code)]
    temp: TempDir,
    /// Working directory of the repository
    pub path: PathBuf,
    repo: Repository,
}

#[allow(dead_code)]
impl SourceRepo {
    /// Create a repository with a single commit containing `README`
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("upstream");
        let repo = Repository::init(&path).expect("Failed to init git repository");
        let source = Self { temp, path, repo };
        source.commit_file("README", "first commit", "Initial commit");
        source
    }

    /// URL to clone this repository from
    pub fn url(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    /// Write a file and commit it on the current branch, returning the SHA
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> String {
        std::fs::write(self.path.join(name), content).expect("Failed to write file");

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let sig = Signature::now("Test", "test@test.com").unwrap();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
            .to_string()
    }

    /// Create a lightweight tag at HEAD
    pub fn tag(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo
            .tag_lightweight(name, head.as_object(), false)
            .unwrap();
    }
}

impl Default for SourceRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// Scratch directories for a cache root and download destinations
#[allow(dead_code)]
pub struct TestDirs {
    temp: TempDir,
}

#[allow(dead_code)]
impl TestDirs {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Cache root handed to srcfetch
    pub fn cache(&self) -> PathBuf {
        self.temp.path().join("cache")
    }

    /// A destination path that does not exist yet
    pub fn dest(&self, name: &str) -> PathBuf {
        self.temp.path().join("dest").join(name)
    }

    /// Any other path under the scratch root
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    /// Number of mirrors currently in the cache
    pub fn mirror_count(&self) -> usize {
        let Ok(entries) = std::fs::read_dir(self.cache()) else {
            return 0;
        };
        entries
            .filter_map(std::result::Result::ok)
            .filter(|e| e.path().is_dir())
            .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .count()
    }
}

impl Default for TestDirs {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a file from a downloaded working copy
#[allow(dead_code)]
pub fn read_file(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).expect("Failed to read file")
}

/// srcfetch command isolated to the given cache root
#[allow(dead_code, deprecated)]
pub fn srcfetch_cmd(cache: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("srcfetch").unwrap();
    cmd.env("SRCFETCH_CACHE_DIR", cache)
        .env_remove("SRCFETCH_MAX_CACHE_SIZE")
        .env_remove("RUST_LOG");
    cmd
}
