//! Promotion: squash the WIP commit into trunk and reset the WIP branch

use crate::stash::ScopedStash;
use crate::{abort_from_error, finish, guard, Workflow};
use anyhow::{Context, Result};
use rp_core::{is_wip_message, Abort, Outcome};
use rp_git::{remote_ref, Backend, PushMode, PushResult, RebaseResult, ResetMode};
use tracing::{info, warn};

/// What a completed promotion did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoteSummary {
    pub trunk: String,
    pub commit: String,
    pub message: String,
    pub files: usize,
}

impl<'a, B: Backend + ?Sized> Workflow<'a, B> {
    /// Fold the WIP commit into one trunk commit with `message`
    pub fn promote(&self, message: &str) -> Outcome<PromoteSummary> {
        match self.try_promote(message) {
            Ok(outcome) => outcome,
            Err(err) => abort_from_error("promotion", err),
        }
    }

    fn try_promote(&self, message: &str) -> Result<Outcome<PromoteSummary>> {
        let backend = self.backend;
        let trunk = self.branches.trunk.as_str();
        let wip = self.branches.wip.as_str();
        let remote = self.branches.remote.as_str();

        let message = message.trim();
        if message.is_empty() {
            return Ok(Outcome::Aborted(
                Abort::new("promotion needs a commit message")
                    .with_remedy("rp promote \"<message>\""),
            ));
        }

        // 1. Guards: in-progress operation, unmerged paths, remote
        if let Some(outcome) = guard::preflight(backend, remote)?.into_outcome() {
            return Ok(outcome);
        }
        let Some(original) = backend.current_branch()? else {
            return Ok(Outcome::Skipped(
                "HEAD is detached; check out a branch first".to_string(),
            ));
        };

        // 2. Preconditions
        if !backend.branch_exists(wip)? {
            return Ok(Outcome::Aborted(
                Abort::new(format!("branch '{}' does not exist", wip))
                    .with_remedy("rp checkpoint"),
            ));
        }
        let tip = backend.commit_message(wip)?.unwrap_or_default();
        if !is_wip_message(&tip) {
            return Ok(Outcome::Aborted(
                Abort::new(format!("tip of '{}' is not a WIP checkpoint", wip))
                    .with_remedy(format!("git log {}..{}", trunk, wip)),
            ));
        }
        if !backend.status()?.is_clean() {
            return Ok(Outcome::Aborted(
                Abort::new("working tree has uncommitted changes")
                    .with_remedy("rp checkpoint, or git stash"),
            ));
        }
        let lease = backend.rev_parse(&remote_ref(remote, wip))?;

        // Tree is clean: only the branch needs restoring
        let restore = ScopedStash::branch_only(backend, &original);

        // 3. Up-to-date trunk
        backend.checkout(trunk)?;
        let verdict = guard::sync_trunk(backend, remote, trunk)?;
        if let Some(outcome) = verdict.into_outcome() {
            return Ok(finish(restore, outcome));
        }

        // 4. Squash into one commit
        if let Err(err) = backend.squash_merge(wip) {
            warn!("squash of {} into {} failed: {}", wip, trunk, err);
            backend.reset("HEAD", ResetMode::Hard)?;
            let abort = Abort::new(format!(
                "squashing '{}' into '{}' hit conflicts",
                wip, trunk
            ))
            .with_remedy(format!("git checkout {} && git rebase {}", wip, trunk));
            return Ok(finish(restore, Outcome::Aborted(abort)));
        }
        let staged = backend.staged_paths()?;
        if staged.is_empty() {
            backend.reset("HEAD", ResetMode::Hard)?;
            let abort = Abort::new(format!(
                "nothing to promote: '{}' has no changes relative to '{}'",
                wip, trunk
            ));
            return Ok(finish(restore, Outcome::Aborted(abort)));
        }
        backend
            .commit(message, false)
            .context("Failed to commit promotion")?;
        let commit = backend
            .rev_parse("HEAD")?
            .context("Promotion commit missing")?;

        // 5. Publish trunk; the WIP branch is only reset once this lands
        match backend.push(remote, trunk, PushMode::FastForward, false)? {
            PushResult::Pushed => info!(%commit, "pushed {}", trunk),
            PushResult::Rejected(detail) => {
                let abort = Abort::new(format!(
                    "push of '{}' was rejected ({}); the promotion commit is kept locally and '{}' is untouched",
                    trunk, detail, wip
                ))
                .with_remedy(format!(
                    "git checkout {} && git pull --rebase {} {} && git push {} {}",
                    trunk, remote, trunk, remote, trunk
                ));
                return Ok(finish(restore, Outcome::Aborted(abort)));
            }
        }

        // 6. Drop the now-redundant WIP commit
        backend.checkout(wip)?;
        if backend.rebase(trunk)? == RebaseResult::Conflict {
            backend.rebase_abort()?;
            let abort = Abort::new(format!(
                "'{}' is pushed, but rebasing '{}' onto it hit conflicts",
                trunk, wip
            ))
            .with_remedy(format!("git checkout {} && git reset --hard {}", wip, trunk));
            return Ok(finish(restore, Outcome::Aborted(abort)));
        }
        let leftover = backend.commits_ahead(trunk, wip)?;
        if leftover != 0 {
            let abort = Abort::new(format!(
                "'{}' still has {} commit(s) not on '{}' after promotion",
                wip, leftover, trunk
            ))
            .with_remedy(format!("git log {}..{}", trunk, wip));
            return Ok(finish(restore, Outcome::Aborted(abort)));
        }

        // 7. Reset the remote WIP branch
        match backend.push(
            remote,
            wip,
            PushMode::Lease {
                expected: lease.clone(),
            },
            lease.is_none(),
        )? {
            PushResult::Pushed => {}
            PushResult::Rejected(detail) => {
                let abort = Abort::new(format!(
                    "'{}' is promoted, but the push of '{}' was rejected ({})",
                    trunk, wip, detail
                ))
                .with_remedy(format!(
                    "git fetch {} && git log {}..{}/{}",
                    remote, wip, remote, wip
                ));
                return Ok(finish(restore, Outcome::Aborted(abort)));
            }
        }

        // 8. Back where we started, unless that was trunk or the WIP branch
        if original == trunk || original == wip {
            restore.keep();
        } else {
            restore
                .restore()
                .with_context(|| format!("Failed to return to '{}'", original))?;
        }

        Ok(Outcome::Completed(PromoteSummary {
            trunk: trunk.to_string(),
            commit,
            message: message.to_string(),
            files: staged.len(),
        }))
    }
}
