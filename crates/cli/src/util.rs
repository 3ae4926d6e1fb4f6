//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rp_core::Config;
use rp_core::Outcome;
use rp_git::GitCli;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Command-line values that override every configuration layer
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub wip_branch: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub debounce_secs: Option<u64>,
}

/// Stderr logging: `warn` by default, `RUST_LOG` honoured, `--verbose` forces debug
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Open the git repository containing the current directory
pub fn open_repo() -> Result<GitCli> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    GitCli::open(&cwd).context("Not inside a git repository")
}

/// Effective configuration for `repo_root` with command-line overrides on top
pub fn load_config(repo_root: Option<&Path>, overrides: &Overrides) -> Result<Config> {
    let mut config = match repo_root {
        Some(root) => Config::load(root)?,
        None => {
            let mut config = Config::default();
            if let Some(path) = rp_core::config::user_config_path() {
                config.merge_file(&path)?;
            }
            config.apply_env(|key| std::env::var(key).ok())?;
            config
        }
    };

    if let Some(wip) = &overrides.wip_branch {
        config.branches.wip = wip.clone();
    }
    if let Some(secs) = overrides.poll_interval_secs {
        config.watch.poll_interval_secs = secs;
    }
    if let Some(secs) = overrides.debounce_secs {
        config.watch.debounce_secs = secs;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Join positional words into one string; `None` when there are none
pub fn join_words(words: &[String]) -> Option<String> {
    let joined = words.join(" ");
    let joined = joined.trim();
    (!joined.is_empty()).then(|| joined.to_string())
}

/// Print an operation outcome; aborts go to stderr with their remedy
pub fn print_outcome<T>(outcome: &Outcome<T>, completed: impl FnOnce(&T) -> String) {
    match outcome {
        Outcome::Completed(value) => println!("{} {}", "✓".green(), completed(value)),
        Outcome::Skipped(reason) => println!("{} {}", "Skipped:".yellow(), reason),
        Outcome::Aborted(abort) => {
            eprintln!("{} {}", "Aborted:".red().bold(), abort.reason);
            if let Some(remedy) = &abort.remedy {
                eprintln!("  {} {}", "try:".dimmed(), remedy);
            }
        }
    }
}

/// First 10 characters of a commit id
pub fn short_id(id: &str) -> &str {
    &id[..id.len().min(10)]
}

/// "1 file" / "3 files"
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
