//! CLI command execution helpers with automatic timing
//!
//! Wraps the `rp` binary built for this test run. Every command runs with
//! the `ROLLPOINT_*` variables cleared and the user config directory pointed
//! at a scratch location, so only the test's own settings apply.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

const ROLLPOINT_VARS: &[&str] = &[
    "ROLLPOINT_POLL_SECS",
    "ROLLPOINT_DEBOUNCE_SECS",
    "ROLLPOINT_WIP_BRANCH",
    "ROLLPOINT_TRUNK",
    "ROLLPOINT_REMOTE",
    "ROLLPOINT_LABEL",
];

/// CLI command builder with timing
pub struct RpCommand {
    binary_path: PathBuf,
    working_dir: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl RpCommand {
    /// Create a new command in the given working directory
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        let working_dir = working_dir.as_ref().to_path_buf();
        let mut env = HashMap::new();
        env.insert(
            "XDG_CONFIG_HOME".to_string(),
            working_dir.join(".git").join("rp-test-config").display().to_string(),
        );

        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_rp")),
            working_dir,
            args: Vec::new(),
            env,
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary_path);
        command.args(&self.args).current_dir(&self.working_dir);
        for var in ROLLPOINT_VARS {
            command.env_remove(var);
        }
        command.env_remove("RUST_LOG").envs(&self.env);
        command
    }

    /// Start without waiting (for `rp watch`)
    pub fn spawn(&self) -> Result<Child> {
        self.command()
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to spawn rp")
    }

    /// Execute command and return result with timing
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();
        let output = self.command().output().context("Failed to execute rp")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// Command execution result with timing
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if stdout contains text
    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    /// Check if stderr contains text
    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}

/// Macro for convenient command construction
///
/// Usage:
/// ```
/// rp!(dir, "checkpoint", "first pass").assert_success()?;
/// rp!(dir, "promote").assert_failure()?;
/// ```
#[macro_export]
macro_rules! rp {
    ($dir:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::RpCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}
