//! Sandbox error types.

use codejail_core::SecurityError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during sandbox operations.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Path containment or identifier validation failed.
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// Target does not exist.
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Target exists but is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Language identifier has no dispatch entry.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The process could not be started at all.
    #[error("Failed to launch {program}: {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Request is structurally valid but cannot be honoured.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Content could not be decoded with the requested encoding.
    #[error("Invalid {encoding} content: {message}")]
    Encoding { encoding: String, message: String },
}

impl SandboxError {
    /// Create a new invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a new launch failure error.
    pub fn launch_failed(program: impl Into<String>, source: io::Error) -> Self {
        Self::LaunchFailed {
            program: program.into(),
            source,
        }
    }

    /// Check if this error was caused by the client's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Security(_)
                | Self::NotFound(_)
                | Self::NotADirectory(_)
                | Self::UnsupportedLanguage(_)
                | Self::InvalidRequest(_)
                | Self::Encoding { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(SandboxError::UnsupportedLanguage("cobol".into()).is_client_error());
        assert!(SandboxError::Security(SecurityError::InvalidSessionId("..".into())).is_client_error());
        assert!(!SandboxError::launch_failed(
            "python3",
            io::Error::new(io::ErrorKind::NotFound, "missing")
        )
        .is_client_error());
        assert!(!SandboxError::Io(io::Error::other("disk")).is_client_error());
    }

    #[test]
    fn test_launch_failed_message_names_program() {
        let err = SandboxError::launch_failed("javac", io::Error::new(io::ErrorKind::NotFound, "nope"));
        assert!(err.to_string().contains("javac"));
    }
}
