//! Diagnostic commands.

use codejail_core::Config;
use codejail_sandbox::Language;
use console::{style, Emoji};
use std::path::{Path, PathBuf};

static CHECK: Emoji = Emoji("✓", "+");
static CROSS: Emoji = Emoji("✗", "x");
static WARN: Emoji = Emoji("⚠", "!");

/// Toolchain binaries of a language that are not on `PATH`.
pub fn missing_toolchain(language: Language) -> Vec<&'static str> {
    language
        .spec()
        .toolchain
        .iter()
        .copied()
        .filter(|binary| which::which(binary).is_err())
        .collect()
}

/// Check that a directory accepts new files.
fn probe_writable(dir: &Path) -> std::io::Result<()> {
    let probe: PathBuf = dir.join(format!(".codejail-probe-{}", std::process::id()));
    std::fs::write(&probe, b"")?;
    std::fs::remove_file(&probe)
}

/// Run the doctor command.
pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("codejail Doctor\n");

    let mut errors = 0;
    let mut warnings = 0;

    // Check config
    println!("Checking configuration...");

    let config = match Config::resolve(config_path) {
        Ok(config) => {
            println!("  {} Configuration loaded", style(CHECK).green());
            match config.validate() {
                Ok(_) => println!("  {} Configuration valid", style(CHECK).green()),
                Err(e) => {
                    println!("  {} Configuration invalid: {}", style(CROSS).red(), e);
                    errors += 1;
                }
            }
            config
        }
        Err(e) => {
            println!("  {} Configuration error: {}", style(CROSS).red(), e);
            println!("    Falling back to defaults for the remaining checks");
            errors += 1;
            Config::default()
        }
    };

    // Check workspace
    println!("\nChecking workspace...");

    let root = &config.workspace.root;
    if root.is_dir() {
        println!("  {} Workspace root exists: {:?}", style(CHECK).green(), root);
        match probe_writable(root) {
            Ok(()) => println!("  {} Workspace root is writable", style(CHECK).green()),
            Err(e) => {
                println!("  {} Workspace root is not writable: {}", style(CROSS).red(), e);
                errors += 1;
            }
        }
    } else {
        println!("  {} Workspace root missing: {:?}", style(WARN).yellow(), root);
        println!("    It will be created by 'codejail serve'");
        warnings += 1;
    }

    if !config.exec.allow_shell_commands {
        println!("  {} Shell commands disabled, only argv arrays accepted", style(WARN).yellow());
    } else if which::which(&config.exec.shell).is_err() {
        println!("  {} Shell {:?} not found on PATH", style(CROSS).red(), config.exec.shell);
        errors += 1;
    } else {
        println!("  {} Shell {:?} found", style(CHECK).green(), config.exec.shell);
    }

    // Check language toolchains
    println!("\nChecking language toolchains...");

    for language in Language::ALL {
        let missing = missing_toolchain(language);
        if missing.is_empty() {
            println!("  {} {} available", style(CHECK).green(), language);
        } else {
            println!(
                "  {} {} unavailable, missing: {}",
                style(WARN).yellow(),
                language,
                missing.join(", ")
            );
            warnings += 1;
        }
    }

    // Summary
    println!("\n{}", style("Summary").bold());
    println!("  Errors: {}", if errors > 0 { style(errors).red() } else { style(errors).green() });
    println!("  Warnings: {}", if warnings > 0 { style(warnings).yellow() } else { style(warnings).green() });

    if errors > 0 {
        anyhow::bail!("{} error(s) found", errors);
    }

    Ok(())
}
