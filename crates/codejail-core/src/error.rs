//! Error types for codejail core.

use std::path::PathBuf;
use thiserror::Error;

/// Core result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for codejail core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Security error: {0}")]
    Security(#[from] SecurityError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON5 parse error: {0}")]
    Json5(String),
}

/// Security-related errors.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// A resolved path lies outside the containment root.
    #[error("Path violation: {attempted} escapes {workspace}")]
    PathViolation {
        attempted: PathBuf,
        workspace: PathBuf,
    },

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    /// Resolution itself failed (symlink loop, permission denied on a prefix).
    #[error("Cannot resolve path {path}: {source}")]
    Unresolvable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SecurityError {
    /// Create a path violation error.
    pub fn path_violation(attempted: impl Into<PathBuf>, workspace: impl Into<PathBuf>) -> Self {
        Self::PathViolation {
            attempted: attempted.into(),
            workspace: workspace.into(),
        }
    }
}
