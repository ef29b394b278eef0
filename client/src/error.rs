//! Client error types

use thiserror::Error;

/// Failure reported by a remote collaborator.
///
/// The coordinator treats every variant the same way; the distinction only
/// matters for logging.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Request never produced a response
    #[error("transport error: {0}")]
    Transport(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Server answered with a non-success status
    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Response body or headers could not be read
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::InvalidResponse(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::InvalidResponse(err.to_string())
    }
}

/// Error surfaced by the sync coordinator on its failure channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("remote call failed: {0}")]
    RemoteCallFailed(#[from] RemoteError),

    /// The operation's future was dropped before the remote answered
    #[error("operation cancelled before the remote answered")]
    Cancelled,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GATHER_API_URL environment variable is required")]
    MissingBaseUrl,

    #[error("Invalid GATHER_API_TIMEOUT value")]
    InvalidTimeout,
}

/// Result type for remote calls
pub type RemoteResult<T> = Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RemoteError::Rejected {
            status: 422,
            message: "title is required".into(),
        };
        assert_eq!(
            err.to_string(),
            "rejected with status 422: title is required"
        );

        let err = SyncError::from(RemoteError::NotFound("activity a-1".into()));
        assert_eq!(
            err.to_string(),
            "remote call failed: not found: activity a-1"
        );

        assert_eq!(
            SyncError::Cancelled.to_string(),
            "operation cancelled before the remote answered"
        );
    }
}
