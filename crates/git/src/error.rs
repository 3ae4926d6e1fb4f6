//! Backend error type

use std::path::PathBuf;

/// Errors raised while talking to the version-control backend
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The `git` executable could not be started
    #[error("failed to run `git {args}`: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    /// `git` ran and exited unsuccessfully
    #[error("`git {args}` failed (exit code {code}): {stderr}")]
    Command {
        args: String,
        code: i32,
        stderr: String,
    },

    #[error("not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a command failure from argument list and captured stderr
    pub fn command(args: &[&str], code: i32, stderr: impl Into<String>) -> Self {
        Error::Command {
            args: args.join(" "),
            code,
            stderr: stderr.into().trim().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
