//! Precondition guards shared by checkpoint and promotion
//!
//! Each guard answers one question with a [`Verdict`]. Both operations run
//! [`preflight`] (in-progress operation, unmerged paths, remote configured)
//! before touching anything, then [`sync_trunk`] while trunk is checked out
//! and, for checkpoints, [`secrets`] once changes are staged.

use rp_core::{Abort, SecretFilter, Verdict};
use rp_git::{Backend, Result, SyncState};
use tracing::{debug, warn};

/// Unfinished merge, rebase, cherry-pick or revert
pub fn in_progress<B: Backend + ?Sized>(backend: &B) -> Result<Verdict> {
    Ok(match backend.in_progress()? {
        Some(op) => Verdict::Skip(format!(
            "a {} is in progress; finish it or run `{}`",
            op,
            op.abort_command()
        )),
        None => Verdict::Proceed,
    })
}

/// Conflicted paths still present in the index
pub fn unmerged<B: Backend + ?Sized>(backend: &B) -> Result<Verdict> {
    let paths = backend.unmerged_paths()?;
    if paths.is_empty() {
        return Ok(Verdict::Proceed);
    }
    Ok(Verdict::Skip(format!(
        "unresolved conflicts in {}; resolve them and `git add` the files",
        paths.join(", ")
    )))
}

pub fn remote_configured<B: Backend + ?Sized>(backend: &B, remote: &str) -> Result<Verdict> {
    if backend.has_remote(remote)? {
        Ok(Verdict::Proceed)
    } else {
        Ok(Verdict::Skip(format!(
            "no remote named '{}'; add one with `git remote add {} <url>`",
            remote, remote
        )))
    }
}

/// Guards 1-3 in order; the first non-proceed verdict wins
pub fn preflight<B: Backend + ?Sized>(backend: &B, remote: &str) -> Result<Verdict> {
    let verdict = in_progress(backend)?;
    if !verdict.is_proceed() {
        return Ok(verdict);
    }
    let verdict = unmerged(backend)?;
    if !verdict.is_proceed() {
        return Ok(verdict);
    }
    remote_configured(backend, remote)
}

/// Fetch and fast-forward the checked-out trunk
///
/// Anything other than up-to-date or fast-forwarded aborts: a diverged or
/// ahead trunk holds commits the remote does not have.
pub fn sync_trunk<B: Backend + ?Sized>(backend: &B, remote: &str, trunk: &str) -> Result<Verdict> {
    backend.fetch(remote)?;
    let state = backend.fast_forward(remote, trunk)?;
    debug!(?state, trunk, "synced trunk");

    Ok(match state {
        SyncState::UpToDate | SyncState::FastForwarded => Verdict::Proceed,
        SyncState::Diverged => Verdict::Abort(
            Abort::new(format!(
                "local '{}' has diverged from '{}/{}'",
                trunk, remote, trunk
            ))
            .with_remedy(format!(
                "git checkout {} && git rebase {}/{}",
                trunk, remote, trunk
            )),
        ),
        SyncState::Ahead => Verdict::Abort(
            Abort::new(format!(
                "local '{}' has unpublished commits not on '{}/{}'",
                trunk, remote, trunk
            ))
            .with_remedy(format!("git log {}/{}..{}", remote, trunk, trunk)),
        ),
        SyncState::MissingRemote => Verdict::Abort(
            Abort::new(format!("remote '{}' has no branch '{}'", remote, trunk))
                .with_remedy(format!("git push -u {} {}", remote, trunk)),
        ),
    })
}

/// Deny-list check over exactly what is staged; unstages everything on a match
pub fn secrets<B: Backend + ?Sized>(
    backend: &B,
    filter: &SecretFilter,
    staged: &[String],
) -> Result<Verdict> {
    let denied = filter.denied(staged);
    if denied.is_empty() {
        return Ok(Verdict::Proceed);
    }

    warn!(count = denied.len(), "secret-like paths staged; unstaging");
    backend.unstage_all()?;
    Ok(Verdict::Abort(
        Abort::new(format!(
            "refusing to commit secret-like files: {}",
            denied.join(", ")
        ))
        .with_remedy("add them to .gitignore or move them out of the repository"),
    ))
}
