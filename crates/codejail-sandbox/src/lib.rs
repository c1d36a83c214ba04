//! Session-scoped execution for codejail.
//!
//! This crate provides the pieces that touch the filesystem and spawn processes:
//! - Session directories under `<workspace>/.sessions/`
//! - Process execution with a wall-clock deadline and process-group kill
//! - Table-driven language dispatch and the code runner built on it
//! - Workspace file operations confined by the path resolver

pub mod error;
pub mod executor;
pub mod files;
pub mod language;
pub mod limits;
pub mod runner;
pub mod session;

pub use error::SandboxError;
pub use executor::{
    CommandExecutor, CommandLine, ExecutionContext, ExecutionResult, TIMEOUT_EXIT_CODE,
    TIMEOUT_MARKER,
};
pub use files::{ContentEncoding, FileEntry, WorkspaceFiles};
pub use language::{Language, LaunchPlan};
pub use limits::ResourceLimits;
pub use runner::{CodeOutcome, CodeRunner, Stage};
pub use session::{Session, SessionGuard, SessionLocks, SessionStore};

/// Result type for sandbox operations.
pub type Result<T> = std::result::Result<T, SandboxError>;
