//! Cache-aware source downloader
//!
//! [`Downloader`] composes the cache store, the reference resolver and the
//! checkout step, and dispatches download-only sources to the archive path.
//!
//! ```text
//! descriptor ─► ensure_entry ─► resolve ─► materialize ─► evict_if_over_budget
//!      │
//!      └─ download_only ─► archive
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::archive::{self, ArchiveFetcher, HttpArchiveFetcher};
use crate::cache::CacheStore;
use crate::checkout::Checkout;
use crate::config::DownloaderConfig;
use crate::error::Result;
use crate::git::{GitBackend, LibGit2Backend};
use crate::resolver::ReferenceResolver;
use crate::source::SourceDescriptor;

/// Downloads package sources into destination directories
pub struct Downloader {
    store: CacheStore,
    git: Arc<dyn GitBackend>,
    archive: Arc<dyn ArchiveFetcher>,
}

impl Downloader {
    /// Create a downloader backed by libgit2 and HTTPS archive downloads
    pub fn new(config: DownloaderConfig) -> Self {
        Self::with_backends(
            config,
            Arc::new(LibGit2Backend),
            Arc::new(HttpArchiveFetcher),
        )
    }

    /// Create a downloader with explicit git and archive backends
    pub fn with_backends(
        config: DownloaderConfig,
        git: Arc<dyn GitBackend>,
        archive: Arc<dyn ArchiveFetcher>,
    ) -> Self {
        let store = CacheStore::new(config.cache_root, config.max_cache_size, git.clone());
        Self {
            store,
            git,
            archive,
        }
    }

    /// The cache store backing this downloader
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Download the source described by `descriptor` into `dest`
    ///
    /// `dest` must be absent or empty. On success it holds a working copy at
    /// the resolved commit (or the unpacked snapshot for download-only
    /// sources). The git path ends with an eviction sweep, which may remove
    /// the mirror that was just used.
    ///
    /// # Errors
    ///
    /// - `InvalidSource` for a malformed descriptor
    /// - `RemoteUnavailable` if the remote cannot be cloned or fetched
    /// - `ReferenceNotFound` if the reference is missing after one refresh
    /// - `ArchiveFetchFailed` if a download-only snapshot cannot be fetched
    /// - `Internal` if a resolved commit cannot be checked out
    pub fn download(&self, descriptor: &SourceDescriptor, dest: &Path) -> Result<()> {
        descriptor.validate()?;

        if descriptor.download_only {
            if descriptor.submodules {
                warn!(
                    url = %descriptor.url,
                    "submodules are not available for download-only sources, skipping them"
                );
            }
            return archive::download_archive(self.archive.as_ref(), descriptor, dest);
        }

        let mut entry = self.store.ensure_entry(&descriptor.url)?;
        let resolved = ReferenceResolver::new(&self.store, self.git.clone()).resolve(
            &mut entry,
            &descriptor.reference,
            descriptor.submodules,
        )?;
        debug!(
            url = %descriptor.url,
            reference = %descriptor.reference,
            sha = %resolved.commit_sha,
            "resolved reference"
        );

        Checkout::new(self.git.clone()).materialize(&entry, &resolved, dest)?;

        let evicted = self.store.evict_if_over_budget()?;
        if !evicted.is_empty() {
            info!(count = evicted.len(), "evicted cached mirrors over budget");
        }
        Ok(())
    }

    /// Local mirror path used as the clone source for `url`
    ///
    /// Clones the mirror if it is not cached yet.
    pub fn clone_url(&self, url: &str) -> Result<PathBuf> {
        Ok(self.store.ensure_entry(url)?.local_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DownloadError;
    use crate::test_fixtures::{CountingBackend, FixtureRepo, create_temp_dir};
    use std::io::Read;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct NoArchive {
        calls: AtomicUsize,
    }

    impl ArchiveFetcher for NoArchive {
        fn fetch(&self, url: &str) -> Result<Box<dyn Read>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(crate::error::archive::fetch_failed(url, "offline"))
        }
    }

    struct Harness {
        temp: tempfile::TempDir,
        backend: Arc<CountingBackend>,
        archive: Arc<NoArchive>,
        downloader: Downloader,
    }

    impl Harness {
        fn new(max_cache_size: u64) -> Self {
            let temp = create_temp_dir();
            let backend = CountingBackend::new();
            let archive = Arc::new(NoArchive::default());
            let config = DownloaderConfig::new(temp.path().join("cache"), max_cache_size);
            let downloader = Downloader::with_backends(config, backend.clone(), archive.clone());
            Self {
                temp,
                backend,
                archive,
                downloader,
            }
        }

        fn dest(&self, name: &str) -> PathBuf {
            self.temp.path().join("pods").join(name)
        }
    }

    fn banana_lib() -> FixtureRepo {
        let repo = FixtureRepo::new();
        repo.commit_file("README", "first commit", "Initial commit");
        repo
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_download_head() {
        let h = Harness::new(u64::MAX);
        let repo = banana_lib();
        let dest = h.dest("BananaLib");

        h.downloader
            .download(&SourceDescriptor::new(repo.url()), &dest)
            .unwrap();

        assert_eq!(read(&dest.join("README")), "first commit");
        assert_eq!(h.backend.clones(), 1);
        assert_eq!(h.backend.fetches(), 1);
    }

    #[test]
    fn test_every_head_download_fetches_once() {
        let h = Harness::new(u64::MAX);
        let repo = banana_lib();

        for i in 1..=3 {
            h.downloader
                .download(&SourceDescriptor::new(repo.url()), &h.dest(&format!("pod{i}")))
                .unwrap();
            assert_eq!(h.backend.fetches(), i);
        }
        assert_eq!(h.backend.clones(), 1);
    }

    #[test]
    fn test_second_download_of_commit_uses_cache_only() {
        let h = Harness::new(u64::MAX);
        let repo = banana_lib();
        let sha = repo.head_sha();
        let descriptor = SourceDescriptor::new(repo.url()).with_commit(&sha[..7]);

        h.downloader.download(&descriptor, &h.dest("first")).unwrap();
        let after_first = h.backend.remote_operations();
        h.downloader.download(&descriptor, &h.dest("second")).unwrap();

        assert_eq!(after_first, 1);
        assert_eq!(h.backend.remote_operations(), after_first);
        assert_eq!(read(&h.dest("second").join("README")), "first commit");
    }

    #[test]
    fn test_absent_commit_fetches_exactly_once() {
        let h = Harness::new(u64::MAX);
        let repo = banana_lib();
        h.downloader
            .download(&SourceDescriptor::new(repo.url()), &h.dest("first"))
            .unwrap();
        let fetches = h.backend.fetches();

        let newer = repo.commit_file("README", "second commit", "Second");
        h.downloader
            .download(
                &SourceDescriptor::new(repo.url()).with_commit(&newer),
                &h.dest("second"),
            )
            .unwrap();

        assert_eq!(h.backend.fetches(), fetches + 1);
        assert_eq!(read(&h.dest("second").join("README")), "second commit");
    }

    #[test]
    fn test_zero_budget_leaves_no_mirror() {
        let h = Harness::new(0);
        let repo = banana_lib();
        let dest = h.dest("BananaLib");

        h.downloader
            .download(&SourceDescriptor::new(repo.url()), &dest)
            .unwrap();

        assert!(dest.join("README").exists());
        assert!(!h.downloader.store().mirror_path(&repo.url()).exists());
        assert!(h.downloader.store().entries().unwrap().is_empty());
    }

    #[test]
    fn test_tag_download() {
        let h = Harness::new(u64::MAX);
        let repo = banana_lib();
        repo.tag("v1.0");
        repo.commit_file("README", "after tag", "After tag");

        h.downloader
            .download(
                &SourceDescriptor::new(repo.url()).with_tag("v1.0"),
                &h.dest("tagged"),
            )
            .unwrap();
        assert_eq!(read(&h.dest("tagged").join("README")), "first commit");
    }

    #[test]
    fn test_advanced_branch_seen_after_next_refresh() {
        let h = Harness::new(u64::MAX);
        let repo = banana_lib();
        repo.create_branch("topicbranch");
        repo.commit_file("README", "topic v1", "Topic v1");
        let branch = SourceDescriptor::new(repo.url()).with_branch("topicbranch");

        h.downloader.download(&branch, &h.dest("old")).unwrap();
        assert_eq!(read(&h.dest("old").join("README")), "topic v1");

        // Branches present locally are served without a fetch, so the new tip
        // arrives with the next refresh of the mirror (here a HEAD download).
        repo.commit_file("README", "topic v2", "Topic v2");
        h.downloader.download(&branch, &h.dest("stale")).unwrap();
        assert_eq!(read(&h.dest("stale").join("README")), "topic v1");

        h.downloader
            .download(&SourceDescriptor::new(repo.url()), &h.dest("head"))
            .unwrap();
        h.downloader.download(&branch, &h.dest("new")).unwrap();

        assert_eq!(read(&h.dest("new").join("README")), "topic v2");
        assert_eq!(read(&h.dest("old").join("README")), "topic v1");
    }

    #[test]
    fn test_new_upstream_branch_refreshes_cache() {
        let h = Harness::new(u64::MAX);
        let repo = banana_lib();
        h.downloader
            .download(&SourceDescriptor::new(repo.url()), &h.dest("head"))
            .unwrap();
        let fetches = h.backend.fetches();

        repo.create_branch("test");
        repo.commit_file("test.txt", "", "test");
        h.downloader
            .download(
                &SourceDescriptor::new(repo.url()).with_branch("test"),
                &h.dest("branch"),
            )
            .unwrap();

        assert!(h.dest("branch").join("test.txt").exists());
        assert_eq!(h.backend.fetches(), fetches + 1);
    }

    #[test]
    fn test_available_branch_does_not_refresh() {
        let h = Harness::new(u64::MAX);
        let repo = banana_lib();
        repo.create_branch("topicbranch");
        let branch = SourceDescriptor::new(repo.url()).with_branch("topicbranch");

        h.downloader.download(&branch, &h.dest("first")).unwrap();
        h.downloader.download(&branch, &h.dest("second")).unwrap();
        assert_eq!(h.backend.fetches(), 0);
    }

    #[test]
    fn test_submodules_only_when_requested() {
        let h = Harness::new(u64::MAX);
        let sub = FixtureRepo::new();
        sub.commit_file("README", "submodule", "Submodule commit");
        let repo = banana_lib();
        repo.add_submodule(&sub, "libs/Sub");

        let plain = SourceDescriptor::new(repo.url());
        h.downloader.download(&plain, &h.dest("plain")).unwrap();
        assert!(h.dest("plain").join(".gitmodules").exists());
        assert!(!h.dest("plain").join("libs/Sub/README").exists());

        h.downloader
            .download(&plain.clone().with_submodules(true), &h.dest("full"))
            .unwrap();
        assert_eq!(read(&h.dest("full").join("libs/Sub/README")), "submodule");
    }

    #[test]
    fn test_nonexistent_commit_and_tag() {
        let h = Harness::new(u64::MAX);
        let repo = banana_lib();

        let err = h
            .downloader
            .download(
                &SourceDescriptor::new(repo.url()).with_commit("aaaaaa"),
                &h.dest("commit"),
            )
            .unwrap_err();
        assert!(matches!(err, DownloadError::ReferenceNotFound { .. }));

        let err = h
            .downloader
            .download(
                &SourceDescriptor::new(repo.url()).with_tag("v9.9"),
                &h.dest("tag"),
            )
            .unwrap_err();
        assert!(matches!(err, DownloadError::ReferenceNotFound { .. }));
        assert!(!h.dest("tag").exists());
    }

    #[test]
    fn test_unreachable_url() {
        let h = Harness::new(u64::MAX);
        let err = h
            .downloader
            .download(&SourceDescriptor::new("find_me_if_you_can"), &h.dest("x"))
            .unwrap_err();
        assert!(matches!(err, DownloadError::RemoteUnavailable { .. }));
    }

    #[test]
    fn test_destination_not_empty() {
        let h = Harness::new(u64::MAX);
        let repo = banana_lib();
        let dest = h.dest("BananaLib");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("existing"), "x").unwrap();

        let err = h
            .downloader
            .download(&SourceDescriptor::new(repo.url()), &dest)
            .unwrap_err();
        assert!(matches!(err, DownloadError::DestinationNotEmpty { .. }));
    }

    #[test]
    fn test_download_only_uses_archive_path() {
        let h = Harness::new(u64::MAX);
        let descriptor = SourceDescriptor::new("https://github.com/a/b.git")
            .with_download_only(true)
            .with_submodules(true);

        let err = h
            .downloader
            .download(&descriptor, &h.dest("archive"))
            .unwrap_err();

        assert!(matches!(err, DownloadError::ArchiveFetchFailed { .. }));
        assert_eq!(h.archive.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.backend.remote_operations(), 0);
    }

    #[test]
    fn test_invalid_descriptor() {
        let h = Harness::new(u64::MAX);
        let err = h
            .downloader
            .download(&SourceDescriptor::new("  "), &h.dest("x"))
            .unwrap_err();
        assert!(matches!(err, DownloadError::InvalidSource { .. }));
        assert_eq!(h.backend.remote_operations(), 0);
    }

    #[test]
    fn test_clone_url_is_local_mirror() {
        let h = Harness::new(u64::MAX);
        let repo = banana_lib();

        let path = h.downloader.clone_url(&repo.url()).unwrap();
        assert_eq!(path, h.downloader.store().mirror_path(&repo.url()));
        assert!(h.backend.is_mirror(&path));
        assert_eq!(h.downloader.clone_url(&repo.url()).unwrap(), path);
        assert_eq!(h.backend.clones(), 1);
    }
}
