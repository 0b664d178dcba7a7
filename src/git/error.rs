//! Git error interpretation
//!
//! This module handles:
//! - Interpreting git2 errors into user-friendly messages
//! - Categorizing remote failures by type (not found, auth, network, etc.)

use git2::{Error, ErrorClass};

/// Why a remote operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFailure {
    RepositoryNotFound,
    AuthenticationFailed,
    PermissionDenied,
    NetworkError,
    CertificateError,
    Other,
}

type FailureCheck = fn(&str, ErrorClass) -> bool;

const CLASSIFICATIONS: &[(FailureCheck, RemoteFailure)] = &[
    (
        |msg, _| {
            msg.contains("not found")
                || msg.contains("404")
                || msg.contains("does not exist")
                || msg.contains("failed to resolve path")
                || msg.contains("too many redirects")
                || msg.contains("authentication replays")
        },
        RemoteFailure::RepositoryNotFound,
    ),
    (
        |msg, _| msg.contains("authentication") || msg.contains("credentials"),
        RemoteFailure::AuthenticationFailed,
    ),
    (
        |msg, _| msg.contains("permission denied") || msg.contains("access denied"),
        RemoteFailure::PermissionDenied,
    ),
    (
        |msg, class| {
            class == ErrorClass::Net
                || msg.contains("connection")
                || msg.contains("network")
                || msg.contains("timed out")
                || msg.contains("timeout")
        },
        RemoteFailure::NetworkError,
    ),
    (
        |msg, class| class == ErrorClass::Http && (msg.contains("certificate") || msg.contains("ssl")),
        RemoteFailure::CertificateError,
    ),
];

/// Classify a git2 error raised by clone or fetch
pub fn classify(err: &Error) -> RemoteFailure {
    let message = err.message().to_lowercase();
    CLASSIFICATIONS
        .iter()
        .find(|(check, _)| check(&message, err.class()))
        .map_or(RemoteFailure::Other, |(_, failure)| *failure)
}

/// Interpret a git2 error and provide a more user-friendly message
pub fn interpret_git_error(err: &Error) -> String {
    match classify(err) {
        RemoteFailure::RepositoryNotFound => "Repository not found".to_string(),
        RemoteFailure::AuthenticationFailed => "Authentication failed".to_string(),
        RemoteFailure::PermissionDenied => "Permission denied".to_string(),
        RemoteFailure::NetworkError => format!("Network error: {}", err.message()),
        RemoteFailure::CertificateError => format!("TLS error: {}", err.message()),
        RemoteFailure::Other => match err.class() {
            ErrorClass::Http => format!("HTTP error: {}", err.message()),
            ErrorClass::Ssh => format!("SSH error: {}", err.message()),
            _ => err.message().to_string(),
        },
    }
}
