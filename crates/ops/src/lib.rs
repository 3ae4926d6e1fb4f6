//! Guarded repository operations for Rollpoint
//!
//! This crate provides:
//! - The guard layer shared by every mutating operation
//! - A scoped stash that restores branch and edits on every exit path
//! - The checkpoint operation (rolling WIP commit, lease push)
//! - The promotion operation (squash WIP into trunk, reset WIP)
//! - A read-only status report

pub mod checkpoint;
pub mod guard;
pub mod promote;
pub mod stash;
pub mod status;

// Re-exports
pub use checkpoint::CheckpointSummary;
pub use promote::PromoteSummary;
pub use stash::ScopedStash;
pub use status::StatusReport;

use rp_core::{Abort, BranchConfig, Config, Outcome, SecretFilter};
use rp_git::{remote_failure_hint, Backend};

/// Checkpoint and promotion bound to one backend and branch layout
pub struct Workflow<'a, B: Backend + ?Sized> {
    backend: &'a B,
    branches: BranchConfig,
    secrets: SecretFilter,
}

impl<'a, B: Backend + ?Sized> Workflow<'a, B> {
    pub fn new(backend: &'a B, branches: BranchConfig, secrets: SecretFilter) -> Self {
        Self {
            backend,
            branches,
            secrets,
        }
    }

    /// Build from effective configuration (branch names and extra secret patterns)
    pub fn from_config(backend: &'a B, config: &Config) -> anyhow::Result<Self> {
        let secrets = SecretFilter::new(&config.guard.extra_secret_patterns)?;
        Ok(Self::new(backend, config.branches.clone(), secrets))
    }

    pub fn backend(&self) -> &'a B {
        self.backend
    }

    pub fn branches(&self) -> &BranchConfig {
        &self.branches
    }
}

/// Collapse an unexpected backend failure into an abort
///
/// Remote failures (authentication, network, unknown remote) get a remedy.
pub(crate) fn abort_from_error<T>(action: &str, err: anyhow::Error) -> Outcome<T> {
    tracing::error!("{} failed: {:#}", action, err);

    let hint = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<rp_git::Error>())
        .and_then(|git_err| match git_err {
            rp_git::Error::Command { stderr, .. } => remote_failure_hint(stderr),
            _ => None,
        });

    let abort = Abort::new(format!("{} failed: {:#}", action, err));
    Outcome::Aborted(match hint {
        Some(remedy) => abort.with_remedy(remedy),
        None => abort,
    })
}

/// Restore `stash` and hand back `outcome`, or abort if the restore failed
pub(crate) fn finish<B: Backend + ?Sized, T>(
    stash: ScopedStash<'_, B>,
    outcome: Outcome<T>,
) -> Outcome<T> {
    let branch = stash.original_branch().to_string();
    match stash.restore() {
        Ok(()) => outcome,
        Err(err) => {
            let earlier = match &outcome {
                Outcome::Aborted(abort) => format!("{}; ", abort.reason),
                _ => String::new(),
            };
            Outcome::Aborted(
                Abort::new(format!(
                    "{}could not restore branch '{}' and your changes: {}",
                    earlier, branch, err
                ))
                .with_remedy(format!("git checkout {} && git stash list", branch)),
            )
        }
    }
}
