//! Archive download errors

use super::DownloadError;

/// Creates an archive fetch failed error
pub fn fetch_failed(url: impl Into<String>, reason: impl Into<String>) -> DownloadError {
    DownloadError::ArchiveFetchFailed {
        url: url.into(),
        reason: reason.into(),
    }
}
