//! codejail command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};
use codejail_core::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// codejail - sandboxed command and code execution runtime
#[derive(Parser)]
#[command(name = "codejail")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "CODEJAIL_CONFIG", global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the runtime server
    Serve(commands::serve::ServeArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Run diagnostics
    Doctor,

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::serve::run(args, config_path).await,
        Commands::Config(args) => commands::config::run(args, config_path).await,
        Commands::Doctor => commands::doctor::run(config_path).await,
        Commands::Version => {
            println!("codejail {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Filter directive for the configured level and `-v` count.
pub fn log_filter(logging: &LoggingConfig, verbose: u8) -> String {
    match verbose {
        0 => logging.level.clone(),
        1 => "codejail=debug".to_string(),
        _ => "codejail=trace".to_string(),
    }
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence.
pub fn init_logging(logging: &LoggingConfig, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(logging, verbose)));

    let json = logging.json;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}
