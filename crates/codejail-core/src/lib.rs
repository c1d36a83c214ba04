//! # codejail-core
//!
//! Core types, configuration, and utilities for codejail.
//!
//! This crate provides shared functionality used across all codejail crates:
//!
//! - **Configuration**: Loading, validation, and environment overrides
//! - **Paths**: Workspace containment for every client-supplied path
//! - **Types**: Validated identifiers such as [`SessionId`]

pub mod config;
pub mod env;
pub mod error;
pub mod id;
pub mod paths;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Error, Result, SecurityError};
pub use paths::PathResolver;
pub use types::*;
