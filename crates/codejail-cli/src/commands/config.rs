//! Configuration management commands.

use clap::Args;
use codejail_core::Config;
use std::path::Path;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key (dot-separated path)
        key: String,
    },

    /// Validate configuration
    Validate,
}

/// Look up a dot-separated key in the serialized configuration.
pub fn lookup(config: &Config, key: &str) -> anyhow::Result<serde_json::Value> {
    let json = serde_json::to_value(config)?;
    key.split('.')
        .try_fold(&json, |value, part| value.get(part))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Key not found: {}", key))
}

/// Run the config command.
pub async fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = Config::resolve(config_path)?;

    match args.command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        ConfigCommand::Get { key } => {
            let value = lookup(&config, &key)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }

        ConfigCommand::Validate => match config.validate() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => anyhow::bail!("{}", e),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_nested_key() {
        let config = Config::default();
        assert_eq!(lookup(&config, "server.port").unwrap(), serde_json::json!(44772));
        assert_eq!(lookup(&config, "exec.shell").unwrap(), serde_json::json!("sh"));
    }

    #[test]
    fn test_lookup_missing_key() {
        let config = Config::default();
        assert!(lookup(&config, "server.nope").is_err());
    }
}
