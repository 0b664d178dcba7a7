//! Cache errors

use super::DownloadError;

/// Creates a cache operation failed error
pub fn operation_failed(message: impl Into<String>) -> DownloadError {
    DownloadError::CacheOperationFailed {
        message: message.into(),
    }
}

/// Creates a cache error for an IO failure on a path
pub fn io_failed(action: &str, path: &std::path::Path, err: &std::io::Error) -> DownloadError {
    DownloadError::CacheOperationFailed {
        message: format!("Failed to {action} {}: {err}", path.display()),
    }
}
