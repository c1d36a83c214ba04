//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 44772;

/// Default execution timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound accepted for `exec.max_timeout_secs` (one day).
pub const TIMEOUT_CEILING_SECS: u64 = 24 * 60 * 60;

/// Main codejail configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Workspace settings.
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Process execution settings.
    #[serde(default)]
    pub exec: ExecConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body in bytes.
    #[serde(default = "default_max_body")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_body() -> usize {
    64 * 1024 * 1024 // 64 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body(),
        }
    }
}

/// Workspace configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root directory bounding every filesystem operation.
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from("/workspace")
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
        }
    }
}

/// Process execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecConfig {
    /// Timeout applied when a request does not specify one.
    #[serde(default = "default_timeout")]
    pub default_timeout_secs: u64,

    /// Upper bound for request-supplied timeouts.
    #[serde(default = "default_max_timeout")]
    pub max_timeout_secs: u64,

    /// Cap on captured bytes per output stream.
    #[serde(default = "default_max_output")]
    pub max_output_bytes: usize,

    /// How long to keep draining output after a timeout kill.
    #[serde(default = "default_kill_grace")]
    pub kill_grace_ms: u64,

    /// Shell used for string commands.
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Flag passing the command string to the shell.
    #[serde(default = "default_shell_flag")]
    pub shell_flag: String,

    /// Accept shell-string commands. When false only argv arrays run.
    #[serde(default = "default_true")]
    pub allow_shell_commands: bool,

    /// Serialize operations that target the same session.
    #[serde(default)]
    pub serialize_sessions: bool,

    /// Environment overrides applied on top of the inherited environment.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_timeout() -> u64 {
    3600 // 1 hour
}

fn default_max_output() -> usize {
    10 * 1024 * 1024 // 10 MB
}

fn default_kill_grace() -> u64 {
    2000
}

fn default_shell() -> String {
    "sh".to_string()
}

fn default_shell_flag() -> String {
    "-c".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_timeout(),
            max_timeout_secs: default_max_timeout(),
            max_output_bytes: default_max_output(),
            kill_grace_ms: default_kill_grace(),
            shell: default_shell(),
            shell_flag: default_shell_flag(),
            allow_shell_commands: true,
            serialize_sessions: false,
            env: HashMap::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "codejail=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
