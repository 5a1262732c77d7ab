//! Error types shared by the capture, storage and replay layers.

use std::path::PathBuf;

/// Errors surfaced by the recorder core.
///
/// State and validation errors are returned synchronously to the caller.
/// Storage and malformed-document errors abort the current operation.
/// Per-event replay failures are logged and swallowed by the engine, so
/// `ReplayExecution` only escapes when a caller drives a sink directly.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("Invalid state: cannot {action} while {state}")]
    InvalidState {
        /// Operation that was attempted
        action: &'static str,
        /// State the session was in
        state: &'static str,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Recording not found: {0}")]
    NotFound(String),

    #[error("Storage error at '{}': {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Replay execution error: {0}")]
    ReplayExecution(String),

    #[error("Malformed recording '{id}': {reason}")]
    MalformedRecording { id: String, reason: String },
}

impl RecorderError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RecorderError::Storage {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        RecorderError::MalformedRecording {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for recorder operations
pub type Result<T> = std::result::Result<T, RecorderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_display() {
        let err = RecorderError::InvalidState {
            action: "pause",
            state: "idle",
        };
        assert_eq!(err.to_string(), "Invalid state: cannot pause while idle");
    }

    #[test]
    fn test_storage_display_includes_path() {
        let err = RecorderError::storage(
            "/tmp/recordings/recording_1.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("recording_1.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_malformed_display() {
        let err = RecorderError::malformed("recording_3", "metadata count mismatch");
        let msg = err.to_string();
        assert!(msg.contains("recording_3"));
        assert!(msg.contains("metadata count mismatch"));
    }
}
