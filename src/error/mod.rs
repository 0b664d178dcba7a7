//! Error types and handling for srcfetch
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`git`]: Remote and reference errors
//! - [`cache`]: Cache store errors
//! - [`archive`]: Archive download errors
//! - [`source`]: Source descriptor errors

pub mod archive;
pub mod cache;
pub mod git;
pub mod source;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for srcfetch operations
#[derive(Error, Diagnostic, Debug)]
pub enum DownloadError {
    // Remote errors
    #[error("Unable to reach repository '{url}': {reason}")]
    #[diagnostic(
        code(srcfetch::git::remote_unavailable),
        help("Check that the URL is correct, reachable, and that you have access to it")
    )]
    RemoteUnavailable { url: String, reason: String },

    #[error("Unable to find reference '{reference}' in '{url}'")]
    #[diagnostic(
        code(srcfetch::git::reference_not_found),
        help("Check that the commit, branch or tag exists in the repository")
    )]
    ReferenceNotFound { reference: String, url: String },

    // Archive errors
    #[error("Failed to download archive from '{url}': {reason}")]
    #[diagnostic(code(srcfetch::archive::fetch_failed))]
    ArchiveFetchFailed { url: String, reason: String },

    // Invariant violations
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(srcfetch::internal),
        help("This is a bug in srcfetch. Clearing the cache with 'srcfetch cache clear' may work around it")
    )]
    Internal { message: String },

    // Source errors
    #[error("Invalid source: {message}")]
    #[diagnostic(
        code(srcfetch::source::invalid),
        help("Specify a git URL and at most one of commit, branch or tag")
    )]
    InvalidSource { message: String },

    #[error("Destination is not empty: {path}")]
    #[diagnostic(
        code(srcfetch::source::destination_not_empty),
        help("Remove the directory or choose another destination")
    )]
    DestinationNotEmpty { path: String },

    // Cache errors
    #[error("Cache operation failed: {message}")]
    #[diagnostic(code(srcfetch::cache::operation_failed))]
    CacheOperationFailed { message: String },

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(srcfetch::config::invalid))]
    ConfigInvalid { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(srcfetch::fs::io_error))]
    IoError { message: String },
}

impl DownloadError {
    /// Whether this error signals a bug rather than a bad descriptor or environment
    pub fn is_internal(&self) -> bool {
        matches!(self, DownloadError::Internal { .. })
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        DownloadError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for DownloadError {
    fn from(err: serde_yaml::Error) -> Self {
        DownloadError::InvalidSource {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DownloadError {
    fn from(err: serde_json::Error) -> Self {
        DownloadError::CacheOperationFailed {
            message: err.to_string(),
        }
    }
}

impl From<git2::Error> for DownloadError {
    fn from(err: git2::Error) -> Self {
        DownloadError::CacheOperationFailed {
            message: err.message().to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, DownloadError>;
