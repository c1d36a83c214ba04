//! CLI routing integration tests.
//!
//! Argument parsing goes through the real `Cli` definition; the commands
//! that do not bind a socket are run in-process.

use clap::Parser;
use codejail_cli::commands::config::ConfigCommand;
use codejail_cli::{run, Cli, Commands};
use tempfile::TempDir;

#[test]
fn test_cli_unknown_command() {
    assert!(Cli::try_parse_from(["codejail", "nonexistent-command"]).is_err());
}

#[test]
fn test_cli_help_lists_commands() {
    let err = match Cli::try_parse_from(["codejail", "--help"]) {
        Ok(_) => panic!("--help should short-circuit parsing"),
        Err(e) => e,
    };
    let help = err.to_string();
    for command in ["serve", "config", "doctor", "version"] {
        assert!(help.contains(command), "help should mention '{}', got: {}", command, help);
    }
}

#[test]
fn test_cli_config_validate_parses() {
    let cli = Cli::try_parse_from(["codejail", "config", "validate"]).unwrap();
    match cli.command {
        Commands::Config(args) => assert!(matches!(args.command, ConfigCommand::Validate)),
        _ => panic!("Expected Config command"),
    }
}

#[tokio::test]
async fn test_cli_version_runs() {
    let cli = Cli::try_parse_from(["codejail", "version"]).unwrap();
    assert!(run(cli).await.is_ok());
}

#[tokio::test]
async fn test_cli_config_validate_rejects_bad_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");
    std::fs::write(&path, "{ exec: { default_timeout_secs: 0 } }").unwrap();

    let cli = Cli::try_parse_from([
        "codejail",
        "config",
        "validate",
        "--config",
        path.to_str().unwrap(),
    ])
    .unwrap();
    let err = run(cli).await.unwrap_err();
    assert!(err.to_string().contains("Default timeout"), "got: {}", err);
}

#[tokio::test]
async fn test_cli_config_missing_file_fails() {
    let cli = Cli::try_parse_from([
        "codejail",
        "config",
        "show",
        "--config",
        "/nonexistent/codejail.json5",
    ])
    .unwrap();
    assert!(run(cli).await.is_err());
}
