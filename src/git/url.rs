//! URL handling for git operations
//!
//! This module handles:
//! - Normalizing SSH URLs from SCP-style to ssh:// format
//! - Normalizing file:// URLs for libgit2 compatibility
//! - Recognizing GitHub repositories for the archive path
//! - Deriving a readable slug for cache directory names

use std::borrow::Cow;
use std::path::Path;

/// Normalize SSH URLs from SCP-style (git@host:path) to ssh:// format.
///
/// libgit2 may have issues with SCP-style SSH URLs, so we convert them to
/// the explicit ssh:// format.
pub fn normalize_ssh_url(url: &str) -> Cow<'_, str> {
    if !url.starts_with("git@") {
        return Cow::Borrowed(url);
    }

    match url.split_once(':') {
        Some((host_part, path_part)) => {
            let path = path_part.strip_prefix('/').unwrap_or(path_part);
            Cow::Owned(format!("ssh://{host_part}/{path}"))
        }
        None => Cow::Borrowed(url),
    }
}

/// Normalize file:// URLs so libgit2 can resolve them on Unix.
pub fn normalize_file_url(url: &str) -> Cow<'_, str> {
    let Some(after) = url.strip_prefix("file://") else {
        return Cow::Borrowed(url);
    };
    if after.contains('\\') {
        return Cow::Owned(format!("file:///{}", after.replace('\\', "/")));
    }
    if !after.is_empty() && !after.starts_with('/') {
        return Cow::Owned(format!("file:///{after}"));
    }
    Cow::Borrowed(url)
}

/// Normalize a URL before handing it to libgit2
pub fn normalize_for_libgit2(url: &str) -> String {
    let url = normalize_ssh_url(url);
    normalize_file_url(&url).into_owned()
}

/// Whether the URL points at the local filesystem
pub fn is_local_url(url: &str) -> bool {
    url.starts_with("file://") || url.starts_with('/') || Path::new(url).is_absolute()
}

/// Extract `(owner, repo)` from a GitHub URL in any of its git forms
///
/// Accepts `https://github.com/o/r(.git)`, `git://github.com/o/r.git`,
/// `git@github.com:o/r.git` and `ssh://git@github.com/o/r.git`.
pub fn github_repository(url: &str) -> Option<(String, String)> {
    let url = url.trim();
    let rest = ["https://", "http://", "git://", "ssh://git@", "git@"]
        .iter()
        .find_map(|prefix| url.strip_prefix(prefix))?;
    let rest = rest
        .strip_prefix("www.github.com")
        .or_else(|| rest.strip_prefix("github.com"))?;
    let path = rest.strip_prefix([':', '/'])?;

    let mut parts = path.trim_end_matches('/').split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().map(|r| r.trim_end_matches(".git"))?;
    if repo.is_empty() || parts.next().is_some() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Characters replaced with hyphens when building a directory name
const PATH_UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '@', '.', ' '];

/// Maximum length of the readable part of a cache directory name
const MAX_SLUG_LEN: usize = 48;

/// Derive a readable, path-safe slug from the last two path segments of a URL
///
/// Example: `https://github.com/lukeredpath/libPusher.git` -> `lukeredpath-libPusher`.
/// Returns `repo` if nothing usable remains.
pub fn repo_slug(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/').trim_end_matches(".git");
    let segments: Vec<&str> = trimmed
        .split(['/', '\\', ':'])
        .filter(|s| !s.is_empty())
        .collect();
    let tail = &segments[segments.len().saturating_sub(2)..];

    let mut slug = String::new();
    for ch in tail.join("-").chars() {
        let ch = if PATH_UNSAFE_CHARS.contains(&ch) || ch.is_control() {
            '-'
        } else {
            ch
        };
        if ch == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(ch);
    }

    let slug: String = slug.trim_matches('-').chars().take(MAX_SLUG_LEN).collect();
    if slug.is_empty() {
        "repo".to_string()
    } else {
        slug
    }
}
