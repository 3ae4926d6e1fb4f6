//! `git` command-line backend
//!
//! Every capability maps onto one or two plain `git` invocations run in the
//! repository root. Calls block until `git` exits; there is no timeout.

use crate::backend::{
    remote_ref, Backend, DiffScope, InProgress, PushMode, PushResult, RebaseResult, ResetMode,
    SyncState,
};
use crate::status::RepositoryStatus;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, warn};

/// Backend that shells out to the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Open the repository containing `path`
    pub fn open(path: &Path) -> Result<Self> {
        let probe = Self {
            root: path.to_path_buf(),
        };
        let output = probe.output(&["rev-parse", "--show-toplevel"])?;
        if !output.status.success() {
            return Err(Error::NotARepository(path.to_path_buf()));
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    /// Repository root (top of the working tree)
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        debug!("git {}", args.join(" "));
        Command::new("git")
            .current_dir(&self.root)
            .args(args)
            // Stable English messages for rejection parsing; never prompt
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|source| Error::Spawn {
                args: args.join(" "),
                source,
            })
    }

    /// Run and return raw stdout, failing on non-zero exit
    fn run_bytes(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(Error::command(
                args,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(output.stdout)
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let stdout = self.run_bytes(args)?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    /// Run a yes/no query: exit 0 is yes, exit 1 is no, anything else fails
    fn query(&self, args: &[&str]) -> Result<bool> {
        let output = self.output(args)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            code => Err(Error::command(
                args,
                code.unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr),
            )),
        }
    }

    /// NUL-separated path list
    fn run_paths(&self, args: &[&str]) -> Result<Vec<String>> {
        let stdout = self.run_bytes(args)?;
        Ok(stdout
            .split(|b| *b == 0)
            .filter(|p| !p.is_empty())
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect())
    }

    fn git_dir(&self) -> Result<PathBuf> {
        let dir = self.run(&["rev-parse", "--absolute-git-dir"])?;
        Ok(PathBuf::from(dir.trim()))
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        self.query(&["merge-base", "--is-ancestor", ancestor, descendant])
    }
}

impl Backend for GitCli {
    fn status(&self) -> Result<RepositoryStatus> {
        let raw = self.run(&["status", "--porcelain=v1", "--untracked-files=all"])?;
        Ok(RepositoryStatus::parse(&raw))
    }

    fn diff(&self, scope: DiffScope) -> Result<Vec<u8>> {
        match scope {
            DiffScope::Staged => {
                self.run_bytes(&["diff", "--cached", "--binary", "--no-color", "--no-ext-diff"])
            }
            DiffScope::Unstaged => self.run_bytes(&["diff", "--binary", "--no-color", "--no-ext-diff"]),
        }
    }

    fn untracked_files(&self) -> Result<Vec<String>> {
        self.run_paths(&["ls-files", "--others", "--exclude-standard", "-z"])
    }

    fn in_progress(&self) -> Result<Option<InProgress>> {
        let git_dir = self.git_dir()?;

        let markers = [
            ("rebase-merge", InProgress::Rebase),
            ("rebase-apply", InProgress::Rebase),
            ("MERGE_HEAD", InProgress::Merge),
            ("CHERRY_PICK_HEAD", InProgress::CherryPick),
            ("REVERT_HEAD", InProgress::Revert),
        ];

        Ok(markers
            .into_iter()
            .find(|(marker, _)| git_dir.join(marker).exists())
            .map(|(_, op)| op))
    }

    fn unmerged_paths(&self) -> Result<Vec<String>> {
        self.run_paths(&["diff", "--name-only", "--diff-filter=U", "-z"])
    }

    fn has_remote(&self, remote: &str) -> Result<bool> {
        let remotes = self.run(&["remote"])?;
        Ok(remotes.lines().any(|r| r.trim() == remote))
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let args = ["symbolic-ref", "--quiet", "--short", "HEAD"];
        let output = self.output(&args)?;
        match output.status.code() {
            Some(0) => Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string())),
            // Detached HEAD
            Some(1) => Ok(None),
            code => Err(Error::command(
                &args,
                code.unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr),
            )),
        }
    }

    fn branch_exists(&self, branch: &str) -> Result<bool> {
        let full = format!("refs/heads/{}", branch);
        self.query(&["show-ref", "--verify", "--quiet", &full])
    }

    fn rev_parse(&self, rev: &str) -> Result<Option<String>> {
        let spec = format!("{}^{{commit}}", rev);
        let output = self.output(&["rev-parse", "--verify", "--quiet", &spec])?;
        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
        } else {
            Ok(None)
        }
    }

    fn commit_message(&self, rev: &str) -> Result<Option<String>> {
        let Some(id) = self.rev_parse(rev)? else {
            return Ok(None);
        };
        let message = self.run(&["log", "-1", "--format=%B", &id])?;
        Ok(Some(message.trim_end().to_string()))
    }

    fn commits_ahead(&self, base: &str, tip: &str) -> Result<usize> {
        let range = format!("{}..{}", base, tip);
        let count = self.run(&["rev-list", "--count", &range])?;
        count.trim().parse().map_err(|_| {
            Error::command(
                &["rev-list", "--count", range.as_str()],
                0,
                format!("unexpected output: {}", count.trim()),
            )
        })
    }

    fn stash_push(&self, message: &str) -> Result<bool> {
        if self.status()?.is_clean() {
            return Ok(false);
        }
        self.run(&["stash", "push", "--include-untracked", "--quiet", "-m", message])?;
        Ok(true)
    }

    fn stash_pop(&self) -> Result<()> {
        // Keep staged/unstaged split when possible
        match self.run(&["stash", "pop", "--index", "--quiet"]) {
            Ok(_) => Ok(()),
            // git refuses before touching the tree when only the index part clashes
            Err(Error::Command { ref stderr, .. })
                if stderr.to_lowercase().contains("conflicts in index") =>
            {
                warn!("staged changes no longer apply cleanly; popping stash without --index");
                self.run(&["stash", "pop", "--quiet"])?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.run(&["checkout", "--quiet", branch])?;
        Ok(())
    }

    fn create_branch(&self, branch: &str, start: &str) -> Result<()> {
        self.run(&["checkout", "--quiet", "-b", branch, start])?;
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        self.run(&["branch", "--quiet", "-D", branch])?;
        Ok(())
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        self.run(&["fetch", "--quiet", remote])?;
        Ok(())
    }

    fn fast_forward(&self, remote: &str, branch: &str) -> Result<SyncState> {
        let Some(upstream) = self.rev_parse(&remote_ref(remote, branch))? else {
            return Ok(SyncState::MissingRemote);
        };
        let local = self
            .rev_parse(&format!("refs/heads/{}", branch))?
            .ok_or_else(|| Error::command(&["rev-parse", branch], 128, "unknown branch"))?;

        if local == upstream {
            return Ok(SyncState::UpToDate);
        }
        if self.is_ancestor(&local, &upstream)? {
            self.run(&["merge", "--ff-only", "--quiet", &upstream])?;
            return Ok(SyncState::FastForwarded);
        }
        if self.is_ancestor(&upstream, &local)? {
            return Ok(SyncState::Ahead);
        }
        Ok(SyncState::Diverged)
    }

    fn rebase(&self, onto: &str) -> Result<RebaseResult> {
        match self.run(&["rebase", "--quiet", onto]) {
            Ok(_) => Ok(RebaseResult::Clean),
            Err(err) => {
                if self.in_progress()? == Some(InProgress::Rebase) {
                    Ok(RebaseResult::Conflict)
                } else {
                    Err(err)
                }
            }
        }
    }

    fn rebase_abort(&self) -> Result<()> {
        self.run(&["rebase", "--abort"])?;
        Ok(())
    }

    fn stage_all(&self) -> Result<()> {
        self.run(&["add", "--all"])?;
        Ok(())
    }

    fn staged_paths(&self) -> Result<Vec<String>> {
        self.run_paths(&["diff", "--cached", "--name-only", "-z"])
    }

    fn unstage_all(&self) -> Result<()> {
        self.run(&["reset", "--quiet"])?;
        Ok(())
    }

    fn commit(&self, message: &str, amend: bool) -> Result<()> {
        let mut args = vec!["commit", "--quiet", "-m", message];
        if amend {
            args.push("--amend");
        }
        self.run(&args)?;
        Ok(())
    }

    fn squash_merge(&self, branch: &str) -> Result<()> {
        self.run(&["merge", "--squash", "--quiet", branch])?;
        Ok(())
    }

    fn reset(&self, rev: &str, mode: ResetMode) -> Result<()> {
        let flag = match mode {
            ResetMode::Soft => "--soft",
            ResetMode::Hard => "--hard",
        };
        self.run(&["reset", "--quiet", flag, rev])?;
        Ok(())
    }

    fn push(
        &self,
        remote: &str,
        branch: &str,
        mode: PushMode,
        set_upstream: bool,
    ) -> Result<PushResult> {
        let lease;
        let mut args = vec!["push", "--porcelain"];
        if let PushMode::Lease { expected } = &mode {
            lease = format!(
                "--force-with-lease=refs/heads/{}:{}",
                branch,
                expected.as_deref().unwrap_or("")
            );
            args.push(&lease);
        }
        if set_upstream {
            args.push("--set-upstream");
        }
        args.push(remote);
        args.push(branch);

        let output = self.output(&args)?;
        if output.status.success() {
            return Ok(PushResult::Pushed);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_rejection(&stdout) || is_rejection(&stderr) {
            let detail = stdout
                .lines()
                .chain(stderr.lines())
                .find(|line| line.contains("rejected") || line.contains("stale info"))
                .unwrap_or("rejected by remote")
                .trim()
                .to_string();
            return Ok(PushResult::Rejected(detail));
        }

        Err(Error::command(&args, output.status.code().unwrap_or(-1), stderr))
    }
}

fn is_rejection(text: &str) -> bool {
    text.contains("[rejected]")
        || text.contains("[remote rejected]")
        || text.contains("stale info")
        || text.contains("non-fast-forward")
}

/// Suggest a fix for a failed remote operation based on its stderr
pub fn remote_failure_hint(stderr: &str) -> Option<&'static str> {
    let lower = stderr.to_lowercase();
    if lower.contains("authentication") || lower.contains("permission denied") {
        Some("check credentials for the remote (SSH keys or `gh auth login`)")
    } else if lower.contains("could not resolve host")
        || lower.contains("network")
        || lower.contains("timed out")
        || lower.contains("connection")
    {
        Some("check your network connection and retry")
    } else if lower.contains("does not appear to be a git repository")
        || lower.contains("not found")
    {
        Some("verify the remote URL with `git remote -v`")
    } else {
        None
    }
}
