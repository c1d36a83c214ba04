//! Serve command.

use anyhow::Context;
use clap::Args;
use codejail_core::Config;
use codejail_gateway::Gateway;
use std::path::{Path, PathBuf};
use tracing::info;

/// Serve command arguments.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen host
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Workspace root directory
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Timeout in seconds for requests that do not set one
    #[arg(long)]
    pub default_timeout: Option<u64>,
}

impl ServeArgs {
    /// Apply command-line overrides on top of the resolved configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(workspace) = &self.workspace {
            config.workspace.root = workspace.clone();
        }
        if let Some(timeout) = self.default_timeout {
            config.exec.default_timeout_secs = timeout;
        }
    }
}

/// Run the serve command.
pub async fn run(args: ServeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = Config::resolve(config_path)?;
    args.apply(&mut config);
    config.validate()?;

    let root = &config.workspace.root;
    std::fs::create_dir_all(root)
        .with_context(|| format!("Failed to create workspace root {}", root.display()))?;
    info!(
        "Default timeout {}s, shell commands {}",
        config.exec.default_timeout_secs,
        if config.exec.allow_shell_commands { "allowed" } else { "disabled" }
    );

    Gateway::new(config)?.run().await?;
    Ok(())
}
