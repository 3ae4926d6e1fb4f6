//! Layered configuration
//!
//! Precedence (lowest to highest):
//! 1. Built-in defaults
//! 2. User file (`<config dir>/rollpoint/config.toml`)
//! 3. Repository file (`<repo>/.rollpoint.toml`)
//! 4. Environment (`ROLLPOINT_*`)
//! 5. Command-line flags (applied by the CLI)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Repository-local config file name
pub const REPO_CONFIG_FILE: &str = ".rollpoint.toml";

/// Environment variable names
pub const ENV_POLL_SECS: &str = "ROLLPOINT_POLL_SECS";
pub const ENV_DEBOUNCE_SECS: &str = "ROLLPOINT_DEBOUNCE_SECS";
pub const ENV_WIP_BRANCH: &str = "ROLLPOINT_WIP_BRANCH";
pub const ENV_TRUNK: &str = "ROLLPOINT_TRUNK";
pub const ENV_REMOTE: &str = "ROLLPOINT_REMOTE";
pub const ENV_LABEL: &str = "ROLLPOINT_LABEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub watch: WatchConfig,
    pub branches: BranchConfig,
    pub guard: GuardConfig,
}

/// Stability detector timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Seconds between polls (1-3600)
    pub poll_interval_secs: u64,
    /// Seconds content must stay unchanged before a checkpoint (1-86400)
    pub debounce_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            debounce_secs: 30,
        }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }
}

/// Branch and remote names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchConfig {
    pub trunk: String,
    pub wip: String,
    pub remote: String,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            trunk: "main".to_string(),
            wip: "me/wip".to_string(),
            remote: "origin".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Extra gitignore-style patterns added to the secret deny-list
    pub extra_secret_patterns: Vec<String>,
}

impl Config {
    /// Layer user file, repository file and environment over the defaults
    ///
    /// Missing files are not an error; malformed ones are. The result is not
    /// validated: callers apply their own overrides, then call [`Config::validate`].
    pub fn load(repo_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_path) = user_config_path() {
            config.merge_file(&user_path)?;
        }
        config.merge_file(&repo_root.join(REPO_CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from a TOML file, if it exists
    ///
    /// Only keys present in the file replace current values.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let overlay: ConfigOverlay = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!("Loaded configuration from {}", path.display());
        overlay.apply(self);
        Ok(())
    }

    /// Apply `ROLLPOINT_*` overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(value) = non_empty(ENV_POLL_SECS) {
            self.watch.poll_interval_secs = value
                .parse()
                .with_context(|| format!("{} must be a positive integer", ENV_POLL_SECS))?;
        }
        if let Some(value) = non_empty(ENV_DEBOUNCE_SECS) {
            self.watch.debounce_secs = value
                .parse()
                .with_context(|| format!("{} must be a positive integer", ENV_DEBOUNCE_SECS))?;
        }
        if let Some(value) = non_empty(ENV_WIP_BRANCH) {
            self.branches.wip = value;
        }
        if let Some(value) = non_empty(ENV_TRUNK) {
            self.branches.trunk = value;
        }
        if let Some(value) = non_empty(ENV_REMOTE) {
            self.branches.remote = value;
        }

        Ok(())
    }

    /// Validate ranges and branch names
    pub fn validate(&self) -> Result<()> {
        if !(1..=3600).contains(&self.watch.poll_interval_secs) {
            anyhow::bail!(
                "watch.poll_interval_secs must be between 1 and 3600 (got {})",
                self.watch.poll_interval_secs
            );
        }
        if !(1..=86400).contains(&self.watch.debounce_secs) {
            anyhow::bail!(
                "watch.debounce_secs must be between 1 and 86400 (got {})",
                self.watch.debounce_secs
            );
        }

        for (key, value) in [
            ("branches.trunk", &self.branches.trunk),
            ("branches.wip", &self.branches.wip),
            ("branches.remote", &self.branches.remote),
        ] {
            if value.trim().is_empty() || value.contains(char::is_whitespace) {
                anyhow::bail!("{} must be a non-empty name without spaces", key);
            }
        }

        if self.branches.trunk == self.branches.wip {
            anyhow::bail!(
                "branches.wip must differ from branches.trunk (both are '{}')",
                self.branches.trunk
            );
        }

        Ok(())
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Checkpoint label from the environment, used when none is given explicitly
pub fn env_label<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_LABEL).filter(|l| !l.trim().is_empty())
}

/// Path of the per-user config file
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rollpoint").join("config.toml"))
}

/// Annotated example configuration
pub fn example_config() -> &'static str {
    r#"# Rollpoint configuration
# Place in <repo>/.rollpoint.toml or <config dir>/rollpoint/config.toml

[watch]
# Seconds between repository polls (1-3600)
poll_interval_secs = 5
# Seconds the content must stay unchanged before a checkpoint (1-86400)
debounce_secs = 30

[branches]
trunk = "main"
wip = "me/wip"
remote = "origin"

[guard]
# Extra gitignore-style patterns refused at commit time
extra_secret_patterns = ["*.tfstate"]
"#
}

/// Partial config as read from a file; absent keys keep the lower layer
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigOverlay {
    watch: WatchOverlay,
    branches: BranchOverlay,
    guard: GuardOverlay,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WatchOverlay {
    poll_interval_secs: Option<u64>,
    debounce_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BranchOverlay {
    trunk: Option<String>,
    wip: Option<String>,
    remote: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GuardOverlay {
    extra_secret_patterns: Option<Vec<String>>,
}

impl ConfigOverlay {
    fn apply(self, config: &mut Config) {
        if let Some(v) = self.watch.poll_interval_secs {
            config.watch.poll_interval_secs = v;
        }
        if let Some(v) = self.watch.debounce_secs {
            config.watch.debounce_secs = v;
        }
        if let Some(v) = self.branches.trunk {
            config.branches.trunk = v;
        }
        if let Some(v) = self.branches.wip {
            config.branches.wip = v;
        }
        if let Some(v) = self.branches.remote {
            config.branches.remote = v;
        }
        if let Some(v) = self.guard.extra_secret_patterns {
            config.guard.extra_secret_patterns = v;
        }
    }
}
