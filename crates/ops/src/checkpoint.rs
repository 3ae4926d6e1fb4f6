//! Rolling WIP checkpoint
//!
//! Keeps exactly one amendable `wip:` commit on the WIP branch ahead of trunk
//! and force-pushes it with a lease. The caller's edits are stashed for the
//! duration and end up checked out on the WIP branch, identical in content.

use crate::stash::ScopedStash;
use crate::{abort_from_error, finish, guard, Workflow};
use anyhow::{Context, Result};
use rp_core::{is_wip_message, Abort, Outcome, Verdict, WipMessage};
use rp_git::{remote_ref, Backend, PushMode, PushResult, RebaseResult, ResetMode};
use tracing::{debug, info, warn};

/// What a completed checkpoint did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointSummary {
    pub branch: String,
    pub commit: String,
    pub message: String,
    /// Tip was rewritten in place rather than a new commit added
    pub amended: bool,
    pub files: usize,
    /// First push of the WIP branch (upstream was set)
    pub created_upstream: bool,
}

impl<'a, B: Backend + ?Sized> Workflow<'a, B> {
    /// Create or amend the rolling WIP commit and push it
    ///
    /// A local WIP branch created by a run that does not complete is removed
    /// again once the original branch is back.
    pub fn checkpoint(&self, label: Option<&str>) -> Outcome<CheckpointSummary> {
        let wip = self.branches.wip.as_str();
        let had_local_wip = match self.backend.branch_exists(wip) {
            Ok(exists) => exists,
            Err(err) => return abort_from_error("checkpoint", err.into()),
        };

        let outcome = match self.try_checkpoint(label) {
            Ok(outcome) => outcome,
            Err(err) => abort_from_error("checkpoint", err),
        };

        if !had_local_wip && !outcome.is_completed() {
            self.discard_new_wip();
        }
        outcome
    }

    fn discard_new_wip(&self) {
        let wip = self.branches.wip.as_str();
        let removable = self.backend.branch_exists(wip).unwrap_or(false)
            && self.backend.current_branch().ok().flatten().as_deref() != Some(wip);
        if !removable {
            return;
        }
        debug!("removing {} created by this checkpoint", wip);
        if let Err(err) = self.backend.delete_branch(wip) {
            warn!("could not remove new branch {}: {}", wip, err);
        }
    }

    fn try_checkpoint(&self, label: Option<&str>) -> Result<Outcome<CheckpointSummary>> {
        let backend = self.backend;
        let trunk = self.branches.trunk.as_str();
        let wip = self.branches.wip.as_str();
        let remote = self.branches.remote.as_str();

        // 1. Guards: in-progress operation, unmerged paths, remote
        if let Some(outcome) = guard::preflight(backend, remote)?.into_outcome() {
            return Ok(outcome);
        }

        // 2. Record starting point
        let Some(original) = backend.current_branch()? else {
            return Ok(Outcome::Skipped(
                "HEAD is detached; check out a branch first".to_string(),
            ));
        };
        let lease = backend.rev_parse(&remote_ref(remote, wip))?;
        let wip_exists = backend.branch_exists(wip)? || lease.is_some();
        debug!(%original, wip_exists, ?lease, "starting checkpoint");

        // 3. Stash everything; restored on every exit path
        let mut stash = ScopedStash::acquire(backend, &original)
            .context("Failed to stash working tree changes")?;

        // 4. Bring trunk up to date
        backend.checkout(trunk)?;
        let verdict = guard::sync_trunk(backend, remote, trunk)?;
        if let Some(outcome) = verdict.into_outcome() {
            return Ok(finish(stash, outcome));
        }

        // 5. Put the WIP branch on top of trunk
        if wip_exists {
            backend.checkout(wip)?;
            if backend.rebase(trunk)? == RebaseResult::Conflict {
                backend.rebase_abort()?;
                let abort = Abort::new(format!(
                    "rebasing '{}' onto '{}' hit conflicts",
                    wip, trunk
                ))
                .with_remedy(format!("git checkout {} && git rebase {}", wip, trunk));
                return Ok(finish(stash, Outcome::Aborted(abort)));
            }
        } else {
            info!("creating {} from {}", wip, trunk);
            backend.create_branch(wip, trunk)?;
        }

        // 6. Edits onto the WIP branch
        stash
            .pop_here()
            .with_context(|| format!("Failed to re-apply changes onto '{}'", wip))?;

        // 7. Stage
        backend.stage_all()?;
        let staged = backend.staged_paths()?;
        if staged.is_empty() {
            return Ok(finish(stash, Outcome::Skipped("nothing to checkpoint".to_string())));
        }

        // 8. Inspect exactly what would be committed
        let verdict = guard::secrets(backend, &self.secrets, &staged)?;
        if let Verdict::Abort(abort) = verdict {
            return Ok(finish(stash, Outcome::Aborted(abort)));
        }

        // 9. Amend the rolling commit or start one
        let message = WipMessage::now(label).to_string();
        let ahead = backend.commits_ahead(trunk, "HEAD")?;
        let tip_is_wip = backend
            .commit_message("HEAD")?
            .is_some_and(|tip| is_wip_message(&tip));
        let amend = ahead > 0 && tip_is_wip;
        let pre_commit = backend
            .rev_parse("HEAD")?
            .context("WIP branch has no commits")?;

        if let Err(err) = backend.commit(&message, amend) {
            backend.unstage_all()?;
            return Err(err).context("Failed to commit checkpoint");
        }

        // 10. Lease push; roll back the commit if it does not land
        let created_upstream = lease.is_none();
        let pushed = backend.push(
            remote,
            wip,
            PushMode::Lease {
                expected: lease.clone(),
            },
            created_upstream,
        );
        match pushed {
            Ok(PushResult::Pushed) => {}
            Ok(PushResult::Rejected(detail)) => {
                warn!("push of {} rejected: {}", wip, detail);
                self.roll_back(&pre_commit)?;
                let abort = Abort::new(format!(
                    "push of '{}' was rejected ({}); the remote moved since it was last fetched",
                    wip, detail
                ))
                .with_remedy(format!(
                    "git fetch {} && git log {}..{}/{}",
                    remote, wip, remote, wip
                ));
                return Ok(finish(stash, Outcome::Aborted(abort)));
            }
            Err(err) => {
                self.roll_back(&pre_commit)?;
                return Err(err).with_context(|| format!("Failed to push '{}'", wip));
            }
        }

        // 11. Done; the WIP branch stays checked out with the caller's edits
        let commit = backend.rev_parse("HEAD")?.unwrap_or_default();
        info!(%commit, amend, files = staged.len(), "checkpoint pushed");
        stash.keep();

        Ok(Outcome::Completed(CheckpointSummary {
            branch: wip.to_string(),
            commit,
            message,
            amended: amend,
            files: staged.len(),
            created_upstream,
        }))
    }

    /// Undo an unpushed commit, leaving its changes in the working tree
    fn roll_back(&self, pre_commit: &str) -> Result<()> {
        self.backend
            .reset(pre_commit, ResetMode::Soft)
            .context("Failed to roll back unpushed checkpoint")?;
        self.backend.unstage_all()?;
        Ok(())
    }
}
