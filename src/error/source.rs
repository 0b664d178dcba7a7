//! Source descriptor errors

use super::DownloadError;

/// Creates an invalid source error
pub fn invalid(message: impl Into<String>) -> DownloadError {
    DownloadError::InvalidSource {
        message: message.into(),
    }
}

/// Creates a destination not empty error
pub fn destination_not_empty(path: &std::path::Path) -> DownloadError {
    DownloadError::DestinationNotEmpty {
        path: path.display().to_string(),
    }
}
