//! HTTP gateway for codejail.
//!
//! This crate provides:
//! - The axum router exposing session, file and execution endpoints
//! - Mapping of sandbox errors to structured JSON error responses
//! - Server startup and graceful shutdown

pub mod error;
pub mod handlers;
pub mod server;

pub use error::GatewayError;
pub use server::{router, shutdown_signal, AppState, Gateway};

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
