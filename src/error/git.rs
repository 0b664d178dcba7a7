//! Remote and reference errors

use super::DownloadError;

/// Creates a remote unavailable error
pub fn remote_unavailable(url: impl Into<String>, reason: impl Into<String>) -> DownloadError {
    DownloadError::RemoteUnavailable {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a reference not found error
pub fn reference_not_found(reference: impl Into<String>, url: impl Into<String>) -> DownloadError {
    DownloadError::ReferenceNotFound {
        reference: reference.into(),
        url: url.into(),
    }
}

/// Creates an internal error for a checkout that failed after a successful resolve
pub fn checkout_invariant(sha: &str, reason: impl std::fmt::Display) -> DownloadError {
    DownloadError::Internal {
        message: format!("commit {sha} was resolved but could not be checked out: {reason}"),
    }
}
