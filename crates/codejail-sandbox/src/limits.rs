//! Resource limits for sandboxed processes.

use codejail_core::config::ExecConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits applied to a single execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum wall clock time in seconds.
    #[serde(default = "default_wall_time")]
    pub wall_time_secs: u64,

    /// Maximum captured bytes per output stream.
    #[serde(default = "default_output_size")]
    pub output_size_bytes: usize,

    /// Time allowed to drain output after a timeout kill, in milliseconds.
    #[serde(default = "default_kill_grace")]
    pub kill_grace_ms: u64,
}

fn default_wall_time() -> u64 {
    30
}

fn default_output_size() -> usize {
    10 * 1024 * 1024 // 10 MB
}

fn default_kill_grace() -> u64 {
    2000
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            wall_time_secs: default_wall_time(),
            output_size_bytes: default_output_size(),
            kill_grace_ms: default_kill_grace(),
        }
    }
}

impl ResourceLimits {
    /// Create new resource limits with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits derived from the runtime's exec configuration.
    pub fn from_config(exec: &ExecConfig) -> Self {
        Self {
            wall_time_secs: exec.default_timeout_secs,
            output_size_bytes: exec.max_output_bytes,
            kill_grace_ms: exec.kill_grace_ms,
        }
    }

    /// Builder-style method to set wall time limit.
    pub fn with_wall_time(mut self, secs: u64) -> Self {
        self.wall_time_secs = secs;
        self
    }

    /// Builder-style method to set the per-stream output cap.
    pub fn with_output_size(mut self, bytes: usize) -> Self {
        self.output_size_bytes = bytes;
        self
    }

    /// Builder-style method to set the post-kill drain window.
    pub fn with_kill_grace(mut self, millis: u64) -> Self {
        self.kill_grace_ms = millis;
        self
    }

    /// Wall time as a duration.
    pub fn wall_time(&self) -> Duration {
        Duration::from_secs(self.wall_time_secs)
    }

    /// Kill grace as a duration.
    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }
}
