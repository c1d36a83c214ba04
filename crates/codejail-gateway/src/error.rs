//! Gateway error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use codejail_core::SecurityError;
use codejail_sandbox::SandboxError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Errors that can occur in the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Failure from a command or code execution path.
    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    /// Failure from a file endpoint; I/O errors here are the client's path.
    #[error(transparent)]
    FileOp(SandboxError),

    /// Request body or query string could not be parsed.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Invalid parameters.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl GatewayError {
    /// Wrap an error from a file endpoint.
    pub fn file_op(err: SandboxError) -> Self {
        Self::FileOp(err)
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Sandbox(e) => sandbox_status(e, StatusCode::INTERNAL_SERVER_ERROR),
            Self::FileOp(e) => sandbox_status(e, StatusCode::BAD_REQUEST),
            Self::InvalidBody(_) | Self::InvalidParams(_) => StatusCode::BAD_REQUEST,
            Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sandbox(e) | Self::FileOp(e) => sandbox_code(e),
            Self::InvalidBody(_) => "invalid_body",
            Self::InvalidParams(_) => "invalid_params",
            Self::Io(_) => "io_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

fn sandbox_status(err: &SandboxError, io_status: StatusCode) -> StatusCode {
    match err {
        SandboxError::Io(_) => io_status,
        SandboxError::NotFound(_) => StatusCode::NOT_FOUND,
        SandboxError::LaunchFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ if err.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn sandbox_code(err: &SandboxError) -> &'static str {
    match err {
        SandboxError::Io(_) => "io_error",
        SandboxError::Security(SecurityError::PathViolation { .. }) => "path_violation",
        SandboxError::Security(SecurityError::InvalidSessionId(_)) => "invalid_session_id",
        SandboxError::Security(SecurityError::Unresolvable { .. }) => "unresolvable_path",
        SandboxError::NotFound(_) => "not_found",
        SandboxError::NotADirectory(_) => "not_a_directory",
        SandboxError::UnsupportedLanguage(_) => "unsupported_language",
        SandboxError::LaunchFailed { .. } => "launch_failed",
        SandboxError::InvalidRequest(_) => "invalid_request",
        SandboxError::Encoding { .. } => "invalid_encoding",
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.to_string(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}
