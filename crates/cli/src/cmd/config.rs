//! Configuration inspection commands
//!
//! Shows the effective configuration after layering defaults, user file,
//! repository file, environment and command-line flags.

use crate::util::{self, Overrides};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rp_core::config::{self as rp_config, Config, REPO_CONFIG_FILE};
use std::path::PathBuf;
use std::process::ExitCode;

/// Keys accepted by `rp config get`
pub const KEYS: &[&str] = &[
    "watch.poll_interval_secs",
    "watch.debounce_secs",
    "branches.trunk",
    "branches.wip",
    "branches.remote",
    "guard.extra_secret_patterns",
];

/// Repository root if the current directory is inside one
fn repo_root() -> Option<PathBuf> {
    util::open_repo().ok().map(|repo| repo.root().to_path_buf())
}

fn effective(overrides: &Overrides) -> Result<Config> {
    util::load_config(repo_root().as_deref(), overrides)
}

/// List all configuration values
pub async fn run_list(overrides: &Overrides) -> Result<ExitCode> {
    let config = effective(overrides)?;

    println!("{}", "Effective Configuration".bold());
    println!();
    for key in KEYS {
        println!("  {} = {}", key.cyan(), lookup(&config, key)?);
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  watch.poll_interval_secs: 1-3600");
    println!("  watch.debounce_secs: 1-86400");

    Ok(ExitCode::SUCCESS)
}

/// Print a single configuration value
pub async fn run_get(key: &str, overrides: &Overrides) -> Result<ExitCode> {
    let config = effective(overrides)?;
    println!("{}", lookup(&config, key)?);
    Ok(ExitCode::SUCCESS)
}

/// Show where configuration files are read from
pub async fn run_path() -> Result<ExitCode> {
    let user = rp_config::user_config_path().context("Could not determine user config directory")?;
    print_location("user", &user);

    match repo_root() {
        Some(root) => print_location("repository", &root.join(REPO_CONFIG_FILE)),
        None => println!("{}: {}", "repository".dimmed(), "(not inside a git repository)".dimmed()),
    }

    Ok(ExitCode::SUCCESS)
}

/// Show example configuration
pub async fn run_example() -> Result<ExitCode> {
    print!("{}", rp_config::example_config());
    Ok(ExitCode::SUCCESS)
}

fn print_location(scope: &str, path: &std::path::Path) {
    let state = if path.exists() { "exists" } else { "not present" };
    println!("{}: {} {}", scope.dimmed(), path.display(), format!("({})", state).dimmed());
}

fn lookup(config: &Config, key: &str) -> Result<String> {
    Ok(match key {
        "watch.poll_interval_secs" => config.watch.poll_interval_secs.to_string(),
        "watch.debounce_secs" => config.watch.debounce_secs.to_string(),
        "branches.trunk" => config.branches.trunk.clone(),
        "branches.wip" => config.branches.wip.clone(),
        "branches.remote" => config.branches.remote.clone(),
        "guard.extra_secret_patterns" => config.guard.extra_secret_patterns.join(", "),
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'rp config list' to see available keys.",
            key
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_key_resolves() {
        let config = Config::default();
        for key in KEYS {
            assert!(lookup(&config, key).is_ok(), "{} should resolve", key);
        }
        assert_eq!(lookup(&config, "branches.wip").unwrap(), "me/wip");
        assert_eq!(lookup(&config, "watch.debounce_secs").unwrap(), "30");
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        assert!(lookup(&Config::default(), "daemon.interval").is_err());
    }
}
