//! Scoped stash with guaranteed restore
//!
//! A [`ScopedStash`] remembers the branch an operation started on and, when
//! created with [`ScopedStash::acquire`], stashes the caller's edits. Whatever
//! way the operation exits, the guard puts the repository back: it returns to
//! the original branch and re-applies the edits there. Explicit
//! [`restore`](ScopedStash::restore) reports failures; the `Drop` fallback can
//! only log them.

use rp_git::{Backend, Result};
use tracing::{debug, error};

/// Message used for stash entries created by Rollpoint
pub const STASH_MESSAGE: &str = "rollpoint: scoped stash";

pub struct ScopedStash<'a, B: Backend + ?Sized> {
    backend: &'a B,
    original_branch: String,
    /// A stash entry created by this guard is still on the stack
    stashed: bool,
    /// Move uncommitted edits back to the original branch on restore
    carry_changes: bool,
    armed: bool,
}

impl<'a, B: Backend + ?Sized> ScopedStash<'a, B> {
    /// Stash tracked and untracked changes, remembering `original_branch`
    pub fn acquire(backend: &'a B, original_branch: &str) -> Result<Self> {
        let stashed = backend.stash_push(STASH_MESSAGE)?;
        debug!(stashed, branch = original_branch, "acquired scoped stash");
        Ok(Self {
            backend,
            original_branch: original_branch.to_string(),
            stashed,
            carry_changes: true,
            armed: true,
        })
    }

    /// Branch restore only; the working tree is expected to be clean
    pub fn branch_only(backend: &'a B, original_branch: &str) -> Self {
        Self {
            backend,
            original_branch: original_branch.to_string(),
            stashed: false,
            carry_changes: false,
            armed: true,
        }
    }

    pub fn original_branch(&self) -> &str {
        &self.original_branch
    }

    pub fn is_stashed(&self) -> bool {
        self.stashed
    }

    /// Re-apply the stashed edits onto whatever branch is checked out now
    pub fn pop_here(&mut self) -> Result<()> {
        if self.stashed {
            self.backend.stash_pop()?;
            self.stashed = false;
        }
        Ok(())
    }

    /// Success: leave the repository exactly as it is now
    pub fn keep(mut self) {
        if self.stashed {
            // Never drop edits silently
            if let Err(err) = self.pop_here() {
                error!("failed to re-apply stashed changes: {}", err);
            }
        }
        self.armed = false;
    }

    /// Return to the original branch and re-apply the caller's edits there
    pub fn restore(mut self) -> Result<()> {
        self.armed = false;
        self.restore_inner()
    }

    fn restore_inner(&mut self) -> Result<()> {
        let current = self.backend.current_branch()?;
        if current.as_deref() != Some(self.original_branch.as_str()) {
            // Edits already popped elsewhere travel back through a fresh stash
            if self.carry_changes && !self.stashed && !self.backend.status()?.is_clean() {
                self.stashed = self.backend.stash_push(STASH_MESSAGE)?;
            }
            debug!(branch = %self.original_branch, "returning to original branch");
            self.backend.checkout(&self.original_branch)?;
        }
        self.pop_here()
    }
}

impl<B: Backend + ?Sized> Drop for ScopedStash<'_, B> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        if let Err(err) = self.restore_inner() {
            error!(
                "could not restore branch '{}' and stashed changes: {} (inspect `git stash list`)",
                self.original_branch, err
            );
        }
    }
}
