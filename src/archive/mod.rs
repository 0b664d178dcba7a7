//! Snapshot archive downloads
//!
//! Sources marked download-only skip the cache entirely: the hosting
//! provider's tarball for the requested reference is fetched over HTTP and
//! unpacked into the destination. Only GitHub is supported.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::EntryType;
use tracing::{debug, info};

use crate::checkout::ensure_empty_destination;
use crate::error::{Result, archive};
use crate::git::url::github_repository;
use crate::source::SourceDescriptor;

/// Fetches the raw bytes of an archive URL
pub trait ArchiveFetcher: Send + Sync {
    /// Open a reader over the response body of a GET on `url`
    fn fetch(&self, url: &str) -> Result<Box<dyn Read>>;
}

/// [`ArchiveFetcher`] over HTTPS
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpArchiveFetcher;

impl ArchiveFetcher for HttpArchiveFetcher {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read>> {
        debug!(url, "requesting archive");
        let response = ureq::get(url).call().map_err(|e| match e {
            ureq::Error::StatusCode(code) => archive::fetch_failed(url, format!("HTTP {code}")),
            other => archive::fetch_failed(url, other.to_string()),
        })?;
        Ok(Box::new(response.into_body().into_reader()))
    }
}

/// The snapshot URL for a descriptor
///
/// # Errors
///
/// Returns `ArchiveFetchFailed` if the repository is not hosted on GitHub.
pub fn archive_url(descriptor: &SourceDescriptor) -> Result<String> {
    let (owner, repo) = github_repository(&descriptor.url).ok_or_else(|| {
        archive::fetch_failed(
            &descriptor.url,
            "download-only sources are supported for GitHub repositories only",
        )
    })?;
    Ok(format!(
        "https://github.com/{owner}/{repo}/archive/{}.tar.gz",
        descriptor.reference.archive_name()
    ))
}

/// Download the snapshot for `descriptor` and unpack it into `dest`
///
/// Nothing is written to `dest` unless the whole archive unpacks.
pub fn download_archive(
    fetcher: &dyn ArchiveFetcher,
    descriptor: &SourceDescriptor,
    dest: &Path,
) -> Result<()> {
    ensure_empty_destination(dest)?;
    let url = archive_url(descriptor)?;

    info!(url = %url, dest = %dest.display(), "downloading archive");
    let body = fetcher.fetch(&url)?;
    unpack_tarball(body, dest).map_err(|reason| archive::fetch_failed(&url, reason))
}

/// Unpack a gzip tarball into `dest`, dropping its top-level directory
///
/// The archive is unpacked into a staging directory next to `dest` and
/// moved into place once every entry succeeded. Entries and links that
/// would resolve outside the archive are rejected. `dest` must be absent
/// or empty.
pub fn unpack_tarball(reader: impl Read, dest: &Path) -> std::result::Result<(), String> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)
        .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
    let staging = tempfile::Builder::new()
        .prefix(".srcfetch-unpack-")
        .tempdir_in(&parent)
        .map_err(|e| format!("failed to create staging directory: {e}"))?;

    let top = unpack_entries(reader, staging.path())?;
    let unpacked = staging.path().join(&top);
    if !unpacked.is_dir() {
        return Err(format!(
            "archive top-level entry {} is not a directory",
            top.to_string_lossy()
        ));
    }

    // An empty destination directory is replaced by the unpacked tree
    if dest.is_dir() {
        std::fs::remove_dir(dest)
            .map_err(|e| format!("failed to replace {}: {e}", dest.display()))?;
    }
    std::fs::rename(&unpacked, dest)
        .map_err(|e| format!("failed to move archive into {}: {e}", dest.display()))?;
    Ok(())
}

/// Unpack every entry under `staging`, returning the shared top-level directory
fn unpack_entries(reader: impl Read, staging: &Path) -> std::result::Result<OsString, String> {
    let mut tarball = tar::Archive::new(GzDecoder::new(reader));
    let entries = tarball
        .entries()
        .map_err(|e| format!("malformed archive: {e}"))?;

    let mut top: Option<OsString> = None;
    let mut unpacked = 0usize;
    for entry in entries {
        let mut entry = entry.map_err(|e| format!("malformed archive: {e}"))?;
        let kind = entry.header().entry_type();
        if matches!(kind, EntryType::XGlobalHeader | EntryType::XHeader) {
            continue;
        }

        let path = entry
            .path()
            .map_err(|e| format!("malformed archive entry: {e}"))?
            .into_owned();
        let first = top_level(&path)?;
        match &top {
            Some(existing) if *existing != first => {
                return Err(format!(
                    "archive has more than one top-level directory: {}",
                    path.display()
                ));
            }
            Some(_) => {}
            None => top = Some(first),
        }

        let relative = strip_top_level(&path)?;
        if kind.is_symlink() || kind.is_hard_link() {
            check_link(&entry, kind, relative.as_deref(), &path)?;
        }

        // unpack_in refuses to write through links that leave the staging root
        let inside = entry
            .unpack_in(staging)
            .map_err(|e| format!("failed to unpack {}: {e}", path.display()))?;
        if !inside {
            return Err(format!("archive entry escapes destination: {}", path.display()));
        }
        unpacked += 1;
    }

    match top {
        Some(top) if unpacked > 0 => {
            debug!(entries = unpacked, "unpacked archive");
            Ok(top)
        }
        _ => Err("archive is empty".to_string()),
    }
}

/// Reject links whose target resolves outside the archive's top-level directory
fn check_link<R: Read>(
    entry: &tar::Entry<'_, R>,
    kind: EntryType,
    relative: Option<&Path>,
    path: &Path,
) -> std::result::Result<(), String> {
    let escapes = || format!("archive link escapes destination: {}", path.display());
    let target = entry
        .link_name()
        .map_err(|e| format!("malformed archive entry: {e}"))?
        .ok_or_else(|| format!("archive link without target: {}", path.display()))?;

    if kind.is_hard_link() {
        // Hard link targets are archive paths, top-level directory included
        return match strip_top_level(&target) {
            Ok(Some(_)) => Ok(()),
            _ => Err(escapes()),
        };
    }

    let Some(relative) = relative else {
        return Err(escapes());
    };
    let mut depth = relative.components().count().saturating_sub(1);
    for component in target.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => depth = depth.checked_sub(1).ok_or_else(escapes)?,
            Component::RootDir | Component::Prefix(_) => return Err(escapes()),
        }
    }
    Ok(())
}

/// The first path component of an archive entry
fn top_level(path: &Path) -> std::result::Result<OsString, String> {
    match path.components().next() {
        Some(Component::Normal(first)) => Ok(first.to_os_string()),
        _ => Err(format!("archive entry escapes destination: {}", path.display())),
    }
}

/// Drop the first path component; `None` for the top-level directory itself
fn strip_top_level(path: &Path) -> std::result::Result<Option<PathBuf>, String> {
    let mut components = path.components();
    components.next();

    let mut relative = PathBuf::new();
    for component in components {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return Err(format!("archive entry escapes destination: {}", path.display())),
        }
    }

    Ok((!relative.as_os_str().is_empty()).then_some(relative))
}
