//! codejail CLI entry point.

use clap::Parser;
use codejail_cli::{init_logging, run, Cli};
use codejail_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logging settings come from config; a broken config is reported by the command itself
    let logging = Config::resolve(cli.config.as_deref())
        .map(|config| config.logging)
        .unwrap_or_default();
    init_logging(&logging, cli.verbose);

    // Run the command
    run(cli).await
}
