//! Configuration loading and persistence.

use super::{Config, TIMEOUT_CEILING_SECS};
use crate::env::{self, vars};
use crate::error::ConfigError;
use std::fs;
use std::path::Path;

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Build the effective startup configuration.
    ///
    /// Defaults, then the config file when one is given, then environment
    /// overrides. An explicitly named file that does not exist is an error.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env_from(env::get_var);
        Ok(config)
    }

    /// Apply environment overrides using the given lookup.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(root) = lookup(vars::WORKSPACE_DIR) {
            self.workspace.root = crate::paths::expand_tilde(&root);
        }
        if let Some(host) = lookup(vars::RUNTIME_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(vars::RUNTIME_PORT).and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(timeout) = lookup(vars::DEFAULT_TIMEOUT).and_then(|v| v.parse().ok()) {
            self.exec.default_timeout_secs = timeout;
        }
        if let Some(json) = lookup(vars::CODEJAIL_LOG_JSON) {
            self.logging.json = env::parse_bool(&json);
        }
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // 1. Server
        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }
        if self.server.host.trim().is_empty() {
            errors.push("Server host cannot be empty".to_string());
        }
        if self.server.max_body_bytes == 0 {
            errors.push("Server max_body_bytes must be greater than 0".to_string());
        }

        // 2. Workspace root must be absolute so containment has a fixed anchor
        if !self.workspace.root.is_absolute() {
            errors.push(format!(
                "Workspace root must be an absolute path, got {:?}",
                self.workspace.root
            ));
        }

        // 3. Timeouts
        if self.exec.default_timeout_secs == 0 {
            errors.push("Default timeout must be greater than 0".to_string());
        }
        if self.exec.max_timeout_secs == 0 {
            errors.push("Max timeout must be greater than 0".to_string());
        }
        if self.exec.max_timeout_secs > TIMEOUT_CEILING_SECS {
            errors.push(format!(
                "Max timeout ({}) exceeds the ceiling of {} seconds",
                self.exec.max_timeout_secs, TIMEOUT_CEILING_SECS
            ));
        }
        if self.exec.default_timeout_secs > self.exec.max_timeout_secs {
            errors.push(format!(
                "Default timeout ({}) exceeds max timeout ({})",
                self.exec.default_timeout_secs, self.exec.max_timeout_secs
            ));
        }

        // 4. Output capture
        if self.exec.max_output_bytes == 0 {
            errors.push("Max output bytes must be greater than 0".to_string());
        }

        // 5. Shell
        if self.exec.shell.trim().is_empty() {
            errors.push("Exec shell cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Clamp a request timeout into the configured range, applying the default.
    pub fn effective_timeout(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.exec.default_timeout_secs)
            .min(self.exec.max_timeout_secs)
    }
}
