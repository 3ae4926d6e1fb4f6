//! Version-control capability interface
//!
//! The guard, checkpoint and promotion logic only ever talk to the repository
//! through [`Backend`]. `GitCli` implements it by running `git`; the
//! in-memory `FakeBackend` implements it for tests.

use crate::status::RepositoryStatus;
use crate::Result;
use std::fmt;

/// Which diff to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffScope {
    /// Index against HEAD
    Staged,
    /// Working tree against index
    Unstaged,
}

/// An unfinished multi-step operation left by another actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InProgress {
    Merge,
    Rebase,
    CherryPick,
    Revert,
}

impl InProgress {
    /// Command that abandons the operation
    pub fn abort_command(&self) -> &'static str {
        match self {
            InProgress::Merge => "git merge --abort",
            InProgress::Rebase => "git rebase --abort",
            InProgress::CherryPick => "git cherry-pick --abort",
            InProgress::Revert => "git revert --abort",
        }
    }
}

impl fmt::Display for InProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InProgress::Merge => "merge",
            InProgress::Rebase => "rebase",
            InProgress::CherryPick => "cherry-pick",
            InProgress::Revert => "revert",
        };
        write!(f, "{}", name)
    }
}

/// Relationship between a local branch and its remote-tracking counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Local already equals remote
    UpToDate,
    /// Local was behind and has been fast-forwarded
    FastForwarded,
    /// Local has commits the remote does not
    Ahead,
    /// Both sides have unique commits
    Diverged,
    /// The remote has no such branch
    MissingRemote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseResult {
    Clean,
    /// Conflicts stopped the rebase; it is left in progress for the caller to abort
    Conflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Move the branch only
    Soft,
    /// Move the branch and overwrite index and working tree
    Hard,
}

/// How a push may update the remote branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMode {
    /// Ordinary push; rejected unless it fast-forwards the remote
    FastForward,
    /// Force push that only succeeds while the remote tip is still `expected`
    /// (`None`: the remote branch must not exist yet)
    Lease { expected: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushResult {
    Pushed,
    Rejected(String),
}

/// Narrow capability set the workflow needs from version control
///
/// Methods take `&self` so a scoped guard can hold the backend while the
/// operation keeps using it.
pub trait Backend {
    /// Porcelain status including untracked files
    fn status(&self) -> Result<RepositoryStatus>;
    fn diff(&self, scope: DiffScope) -> Result<Vec<u8>>;
    fn untracked_files(&self) -> Result<Vec<String>>;

    fn in_progress(&self) -> Result<Option<InProgress>>;
    fn unmerged_paths(&self) -> Result<Vec<String>>;
    fn has_remote(&self, remote: &str) -> Result<bool>;

    /// Checked-out branch, `None` when HEAD is detached
    fn current_branch(&self) -> Result<Option<String>>;
    fn branch_exists(&self, branch: &str) -> Result<bool>;
    /// Resolve a revision to a commit id
    fn rev_parse(&self, rev: &str) -> Result<Option<String>>;
    fn commit_message(&self, rev: &str) -> Result<Option<String>>;
    /// Commits reachable from `tip` but not from `base`
    fn commits_ahead(&self, base: &str, tip: &str) -> Result<usize>;

    /// Stash tracked and untracked changes; `false` when there was nothing to stash
    fn stash_push(&self, message: &str) -> Result<bool>;
    fn stash_pop(&self) -> Result<()>;

    fn checkout(&self, branch: &str) -> Result<()>;
    /// Create `branch` at `start` and check it out
    fn create_branch(&self, branch: &str, start: &str) -> Result<()>;
    /// Delete a local branch that is not checked out, merged or not
    fn delete_branch(&self, branch: &str) -> Result<()>;

    fn fetch(&self, remote: &str) -> Result<()>;
    /// Fast-forward the checked-out `branch` to `remote`'s tip when possible
    fn fast_forward(&self, remote: &str, branch: &str) -> Result<SyncState>;
    /// Rebase the checked-out branch onto `onto`
    fn rebase(&self, onto: &str) -> Result<RebaseResult>;
    fn rebase_abort(&self) -> Result<()>;

    fn stage_all(&self) -> Result<()>;
    fn staged_paths(&self) -> Result<Vec<String>>;
    fn unstage_all(&self) -> Result<()>;
    fn commit(&self, message: &str, amend: bool) -> Result<()>;
    /// Bring `branch`'s changes into the index without committing
    fn squash_merge(&self, branch: &str) -> Result<()>;
    fn reset(&self, rev: &str, mode: ResetMode) -> Result<()>;

    fn push(&self, remote: &str, branch: &str, mode: PushMode, set_upstream: bool)
        -> Result<PushResult>;
}

/// Full name of the remote-tracking ref for `branch`
pub fn remote_ref(remote: &str, branch: &str) -> String {
    format!("refs/remotes/{}/{}", remote, branch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_ref() {
        assert_eq!(remote_ref("origin", "me/wip"), "refs/remotes/origin/me/wip");
    }

    #[test]
    fn test_in_progress_display_and_remedy() {
        assert_eq!(InProgress::CherryPick.to_string(), "cherry-pick");
        assert_eq!(InProgress::Rebase.abort_command(), "git rebase --abort");
    }
}
