//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be written to disk, loaded
//! back, and layered with environment overrides.

use codejail_core::config::Config;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.server.port, config.server.port);
    assert_eq!(loaded.workspace.root, config.workspace.root);
    assert_eq!(loaded.exec.default_timeout_secs, config.exec.default_timeout_secs);
    assert_eq!(loaded.exec.allow_shell_commands, config.exec.allow_shell_commands);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");

    let mut config = Config::default();
    config.server.port = 9090;
    config.exec.serialize_sessions = true;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.server.port, 9090);
    assert!(loaded.exec.serialize_sessions);
}

#[test]
fn test_env_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");
    std::fs::write(&path, "{ server: { port: 8000 }, exec: { default_timeout_secs: 10 } }").unwrap();

    let env: HashMap<&str, &str> = [
        ("RUNTIME_PORT", "8100"),
        ("WORKSPACE_DIR", "/srv/jail"),
    ]
    .into_iter()
    .collect();

    let mut config = Config::load(&path).unwrap();
    config.apply_env_from(|name| env.get(name).map(|v| v.to_string()));

    assert_eq!(config.server.port, 8100);
    assert_eq!(config.workspace.root, PathBuf::from("/srv/jail"));
    assert_eq!(config.exec.default_timeout_secs, 10);
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/config.json5"));
    assert!(result.is_err());
    assert!(Config::resolve(Some(Path::new("/nonexistent/config.json5"))).is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}
