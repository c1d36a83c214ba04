//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Interpret a flag value such as `1`, `true`, `yes` or `on`.
pub fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Environment variable names read at startup.
pub mod vars {
    /// Workspace root directory.
    pub const WORKSPACE_DIR: &str = "WORKSPACE_DIR";

    /// Listen host.
    pub const RUNTIME_HOST: &str = "RUNTIME_HOST";

    /// Listen port.
    pub const RUNTIME_PORT: &str = "RUNTIME_PORT";

    /// Default execution timeout in seconds.
    pub const DEFAULT_TIMEOUT: &str = "CODEJAIL_DEFAULT_TIMEOUT";

    /// JSON log output.
    pub const CODEJAIL_LOG_JSON: &str = "CODEJAIL_LOG_JSON";
}
