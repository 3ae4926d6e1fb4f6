//! In-memory backend for tests
//!
//! Models just enough of a repository to exercise the workflow: commits with
//! flat file trees, local branches, one remote (`origin`) with its
//! remote-tracking refs, an index, a working tree, a stash stack and
//! in-progress markers. File contents are plain strings.

use crate::backend::{
    Backend, DiffScope, InProgress, PushMode, PushResult, RebaseResult, ResetMode, SyncState,
};
use crate::status::RepositoryStatus;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

type Tree = BTreeMap<String, String>;
/// Path -> new content (`None` = deleted)
type Changes = BTreeMap<String, Option<String>>;

const REMOTE: &str = "origin";

#[derive(Debug, Clone)]
struct Commit {
    parent: Option<String>,
    message: String,
    tree: Tree,
}

#[derive(Debug, Clone)]
struct StashEntry {
    base: Tree,
    index: Tree,
    worktree: Tree,
}

#[derive(Debug, Default)]
struct FakeRepo {
    commits: HashMap<String, Commit>,
    next_id: u64,
    branches: BTreeMap<String, String>,
    remote_branches: BTreeMap<String, String>,
    tracking: BTreeMap<String, String>,
    head: Option<String>,
    detached: Option<String>,
    index: Tree,
    worktree: Tree,
    stash: Vec<StashEntry>,
    remote_configured: bool,
    in_progress: Option<InProgress>,
    unmerged: Vec<String>,
    reject_pushes: bool,
    pushes: Vec<String>,
    commands: Vec<String>,
}

fn fail(args: &str, stderr: &str) -> Error {
    Error::command(&[args], 1, stderr)
}

fn diff_trees(from: &Tree, to: &Tree) -> Changes {
    let mut changes = Changes::new();
    for (path, content) in to {
        if from.get(path) != Some(content) {
            changes.insert(path.clone(), Some(content.clone()));
        }
    }
    for path in from.keys() {
        if !to.contains_key(path) {
            changes.insert(path.clone(), None);
        }
    }
    changes
}

fn apply(tree: &Tree, changes: &Changes) -> Tree {
    let mut out = tree.clone();
    for (path, content) in changes {
        match content {
            Some(c) => {
                out.insert(path.clone(), c.clone());
            }
            None => {
                out.remove(path);
            }
        }
    }
    out
}

/// Paths where applying `changes` (made against `base`) onto `target`
/// would clobber a different edit
fn conflicts(base: &Tree, target: &Tree, changes: &Changes) -> Vec<String> {
    changes
        .iter()
        .filter(|(path, new)| {
            let ours = target.get(*path);
            ours != base.get(*path) && ours != new.as_ref()
        })
        .map(|(path, _)| path.clone())
        .collect()
}

fn render_changes(changes: &Changes) -> Vec<u8> {
    let mut out = String::new();
    for (path, content) in changes {
        out.push_str(path);
        out.push('\n');
        out.push_str(content.as_deref().unwrap_or("<deleted>"));
        out.push('\n');
    }
    out.into_bytes()
}

impl FakeRepo {
    fn new_commit(&mut self, parent: Option<String>, message: &str, tree: Tree) -> String {
        self.next_id += 1;
        let id = format!("{:040x}", self.next_id);
        self.commits.insert(
            id.clone(),
            Commit {
                parent,
                message: message.to_string(),
                tree,
            },
        );
        id
    }

    fn head_id(&self) -> Option<String> {
        match &self.head {
            Some(branch) => self.branches.get(branch).cloned(),
            None => self.detached.clone(),
        }
    }

    fn tree_of(&self, id: Option<&str>) -> Tree {
        id.and_then(|id| self.commits.get(id))
            .map(|c| c.tree.clone())
            .unwrap_or_default()
    }

    fn head_tree(&self) -> Tree {
        self.tree_of(self.head_id().as_deref())
    }

    fn resolve(&self, rev: &str) -> Option<String> {
        if rev == "HEAD" {
            return self.head_id();
        }
        if let Some(branch) = rev.strip_prefix("refs/heads/") {
            return self.branches.get(branch).cloned();
        }
        let remote_prefix = format!("refs/remotes/{}/", REMOTE);
        let short_prefix = format!("{}/", REMOTE);
        if let Some(branch) = rev
            .strip_prefix(&remote_prefix)
            .or_else(|| rev.strip_prefix(&short_prefix))
        {
            if let Some(id) = self.tracking.get(branch) {
                return Some(id.clone());
            }
        }
        if let Some(id) = self.branches.get(rev) {
            return Some(id.clone());
        }
        self.commits.contains_key(rev).then(|| rev.to_string())
    }

    /// `id` and all its ancestors, newest first
    fn ancestry(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut current = Some(id.to_string());
        while let Some(id) = current {
            current = self.commits.get(&id).and_then(|c| c.parent.clone());
            out.push(id);
        }
        out
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        self.ancestry(descendant).iter().any(|id| id == ancestor)
    }

    fn merge_base(&self, a: &str, b: &str) -> Option<String> {
        let theirs: BTreeSet<String> = self.ancestry(b).into_iter().collect();
        self.ancestry(a).into_iter().find(|id| theirs.contains(id))
    }

    fn is_clean(&self) -> bool {
        let head = self.head_tree();
        self.index == head && self.worktree == head
    }

    fn status_text(&self) -> String {
        let head = self.head_tree();
        let paths: BTreeSet<&String> = head
            .keys()
            .chain(self.index.keys())
            .chain(self.worktree.keys())
            .collect();

        let mut out = String::new();
        for path in paths {
            if self.unmerged.contains(path) {
                out.push_str(&format!("UU {}\n", path));
                continue;
            }
            let (h, i, w) = (head.get(path), self.index.get(path), self.worktree.get(path));
            if h.is_none() && i.is_none() {
                out.push_str(&format!("?? {}\n", path));
                continue;
            }
            let x = match (h, i) {
                (None, Some(_)) => 'A',
                (Some(_), None) => 'D',
                (Some(a), Some(b)) if a != b => 'M',
                _ => ' ',
            };
            let y = match (i, w) {
                (Some(_), None) => 'D',
                (Some(a), Some(b)) if a != b => 'M',
                _ => ' ',
            };
            if x != ' ' || y != ' ' {
                out.push_str(&format!("{}{} {}\n", x, y, path));
            }
        }
        out
    }

    /// Switch HEAD to `branch`, carrying local changes like git does
    fn switch_to(&mut self, branch: &str) -> Result<()> {
        let target = self
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| fail("checkout", &format!("pathspec '{}' did not match", branch)))?;

        let head = self.head_tree();
        let target_tree = self.tree_of(Some(&target));
        let wt_changes = diff_trees(&head, &self.worktree);
        let idx_changes = diff_trees(&head, &self.index);

        let blocked: Vec<&String> = wt_changes
            .keys()
            .chain(idx_changes.keys())
            .filter(|p| head.get(*p) != target_tree.get(*p))
            .collect();
        if !blocked.is_empty() {
            return Err(fail(
                "checkout",
                "Your local changes to the following files would be overwritten by checkout",
            ));
        }

        self.worktree = apply(&target_tree, &wt_changes);
        self.index = apply(&target_tree, &idx_changes);
        self.head = Some(branch.to_string());
        self.detached = None;
        Ok(())
    }

    /// Point the checked-out branch at `id` and sync index and worktree
    fn move_head_hard(&mut self, id: &str) {
        match &self.head {
            Some(branch) => {
                self.branches.insert(branch.clone(), id.to_string());
            }
            None => self.detached = Some(id.to_string()),
        }
        let tree = self.tree_of(Some(id));
        self.index = tree.clone();
        self.worktree = tree;
    }
}

/// Thread-safe in-memory [`Backend`]
pub struct FakeBackend {
    repo: Mutex<FakeRepo>,
}

impl FakeBackend {
    /// Repository on `main` with one commit (`README.md`), already pushed to `origin`
    pub fn new() -> Self {
        let mut repo = FakeRepo {
            remote_configured: true,
            ..Default::default()
        };

        let mut tree = Tree::new();
        tree.insert("README.md".to_string(), "hello\n".to_string());
        let root = repo.new_commit(None, "initial", tree.clone());

        repo.branches.insert("main".to_string(), root.clone());
        repo.remote_branches.insert("main".to_string(), root.clone());
        repo.tracking.insert("main".to_string(), root);
        repo.head = Some("main".to_string());
        repo.index = tree.clone();
        repo.worktree = tree;

        Self {
            repo: Mutex::new(repo),
        }
    }

    // Working tree manipulation

    pub fn write(&self, path: &str, content: &str) {
        self.repo
            .lock()
            .worktree
            .insert(path.to_string(), content.to_string());
    }

    pub fn delete(&self, path: &str) {
        self.repo.lock().worktree.remove(path);
    }

    pub fn read(&self, path: &str) -> Option<String> {
        self.repo.lock().worktree.get(path).cloned()
    }

    // Scenario knobs

    pub fn set_in_progress(&self, op: Option<InProgress>) {
        self.repo.lock().in_progress = op;
    }

    pub fn set_unmerged(&self, paths: &[&str]) {
        self.repo.lock().unmerged = paths.iter().map(|p| p.to_string()).collect();
    }

    pub fn remove_remote(&self) {
        self.repo.lock().remote_configured = false;
    }

    pub fn reject_pushes(&self, reject: bool) {
        self.repo.lock().reject_pushes = reject;
    }

    /// Detach HEAD at the current commit
    pub fn detach(&self) {
        let mut repo = self.repo.lock();
        repo.detached = repo.head_id();
        repo.head = None;
    }

    /// Another session pushes a commit to `branch` on the remote
    ///
    /// Remote-tracking refs are not touched until the next fetch.
    pub fn remote_commit(&self, branch: &str, path: &str, content: &str, message: &str) -> String {
        let mut repo = self.repo.lock();
        let parent = repo.remote_branches.get(branch).cloned();
        let mut tree = repo.tree_of(parent.as_deref());
        tree.insert(path.to_string(), content.to_string());
        let id = repo.new_commit(parent, message, tree);
        repo.remote_branches.insert(branch.to_string(), id.clone());
        id
    }

    /// Commit a single file directly on the checked-out branch
    pub fn local_commit(&self, path: &str, content: &str, message: &str) -> String {
        let mut repo = self.repo.lock();
        let parent = repo.head_id();
        let mut tree = repo.tree_of(parent.as_deref());
        tree.insert(path.to_string(), content.to_string());
        let id = repo.new_commit(parent, message, tree);
        repo.move_head_hard(&id);
        id
    }

    // Inspection

    pub fn branch_tip(&self, branch: &str) -> Option<String> {
        self.repo.lock().branches.get(branch).cloned()
    }

    pub fn remote_tip(&self, branch: &str) -> Option<String> {
        self.repo.lock().remote_branches.get(branch).cloned()
    }

    pub fn message_of(&self, rev: &str) -> Option<String> {
        let repo = self.repo.lock();
        let id = repo.resolve(rev)?;
        repo.commits.get(&id).map(|c| c.message.clone())
    }

    /// Files in the tree of `rev`
    pub fn tree_at(&self, rev: &str) -> BTreeMap<String, String> {
        let repo = self.repo.lock();
        let id = repo.resolve(rev);
        repo.tree_of(id.as_deref())
    }

    pub fn stash_depth(&self) -> usize {
        self.repo.lock().stash.len()
    }

    /// Branches pushed so far, in order
    pub fn pushes(&self) -> Vec<String> {
        self.repo.lock().pushes.clone()
    }

    /// Every mutating call made so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.repo.lock().commands.clone()
    }

    pub fn is_clean(&self) -> bool {
        self.repo.lock().is_clean()
    }

    fn record(&self, command: String) {
        self.repo.lock().commands.push(command);
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for FakeBackend {
    fn status(&self) -> Result<RepositoryStatus> {
        Ok(RepositoryStatus::parse(&self.repo.lock().status_text()))
    }

    fn diff(&self, scope: DiffScope) -> Result<Vec<u8>> {
        let repo = self.repo.lock();
        let changes = match scope {
            DiffScope::Staged => diff_trees(&repo.head_tree(), &repo.index),
            DiffScope::Unstaged => {
                let tracked: Tree = repo
                    .worktree
                    .iter()
                    .filter(|(p, _)| repo.index.contains_key(*p))
                    .map(|(p, c)| (p.clone(), c.clone()))
                    .collect();
                diff_trees(&repo.index, &tracked)
            }
        };
        Ok(render_changes(&changes))
    }

    fn untracked_files(&self) -> Result<Vec<String>> {
        let repo = self.repo.lock();
        Ok(repo
            .worktree
            .keys()
            .filter(|p| !repo.index.contains_key(*p))
            .cloned()
            .collect())
    }

    fn in_progress(&self) -> Result<Option<InProgress>> {
        Ok(self.repo.lock().in_progress)
    }

    fn unmerged_paths(&self) -> Result<Vec<String>> {
        Ok(self.repo.lock().unmerged.clone())
    }

    fn has_remote(&self, remote: &str) -> Result<bool> {
        Ok(remote == REMOTE && self.repo.lock().remote_configured)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.repo.lock().head.clone())
    }

    fn branch_exists(&self, branch: &str) -> Result<bool> {
        Ok(self.repo.lock().branches.contains_key(branch))
    }

    fn rev_parse(&self, rev: &str) -> Result<Option<String>> {
        Ok(self.repo.lock().resolve(rev))
    }

    fn commit_message(&self, rev: &str) -> Result<Option<String>> {
        Ok(self.message_of(rev))
    }

    fn commits_ahead(&self, base: &str, tip: &str) -> Result<usize> {
        let repo = self.repo.lock();
        let (Some(base), Some(tip)) = (repo.resolve(base), repo.resolve(tip)) else {
            return Err(fail("rev-list", "bad revision"));
        };
        let behind: BTreeSet<String> = repo.ancestry(&base).into_iter().collect();
        Ok(repo
            .ancestry(&tip)
            .into_iter()
            .filter(|id| !behind.contains(id))
            .count())
    }

    fn stash_push(&self, message: &str) -> Result<bool> {
        self.record(format!("stash push {}", message));
        let mut repo = self.repo.lock();
        if repo.is_clean() {
            return Ok(false);
        }
        let base = repo.head_tree();
        let entry = StashEntry {
            base: base.clone(),
            index: repo.index.clone(),
            worktree: repo.worktree.clone(),
        };
        repo.stash.push(entry);
        repo.index = base.clone();
        repo.worktree = base;
        Ok(true)
    }

    fn stash_pop(&self) -> Result<()> {
        self.record("stash pop".to_string());
        let mut repo = self.repo.lock();
        let entry = repo
            .stash
            .pop()
            .ok_or_else(|| fail("stash", "No stash entries found."))?;

        let wt_changes = diff_trees(&entry.base, &entry.worktree);
        let idx_changes = diff_trees(&entry.base, &entry.index);
        if !conflicts(&entry.base, &repo.worktree, &wt_changes).is_empty() {
            repo.stash.push(entry);
            return Err(fail("stash", "CONFLICT: could not apply stash"));
        }

        repo.worktree = apply(&repo.worktree, &wt_changes);
        repo.index = apply(&repo.index, &idx_changes);
        Ok(())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.record(format!("checkout {}", branch));
        let mut repo = self.repo.lock();
        if !repo.branches.contains_key(branch) {
            // git's DWIM: create a local branch from the remote-tracking one
            match repo.tracking.get(branch).cloned() {
                Some(id) => {
                    repo.branches.insert(branch.to_string(), id);
                }
                None => {
                    return Err(fail("checkout", &format!("pathspec '{}' did not match", branch)))
                }
            }
        }
        repo.switch_to(branch)
    }

    fn create_branch(&self, branch: &str, start: &str) -> Result<()> {
        self.record(format!("create-branch {} {}", branch, start));
        let mut repo = self.repo.lock();
        if repo.branches.contains_key(branch) {
            return Err(fail("checkout", &format!("a branch named '{}' already exists", branch)));
        }
        let id = repo
            .resolve(start)
            .ok_or_else(|| fail("checkout", &format!("invalid reference: {}", start)))?;
        repo.branches.insert(branch.to_string(), id);
        if let Err(err) = repo.switch_to(branch) {
            repo.branches.remove(branch);
            return Err(err);
        }
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        self.record(format!("delete-branch {}", branch));
        let mut repo = self.repo.lock();
        if repo.head.as_deref() == Some(branch) {
            return Err(fail(
                "branch",
                &format!("cannot delete branch '{}' checked out", branch),
            ));
        }
        if repo.branches.remove(branch).is_none() {
            return Err(fail("branch", &format!("branch '{}' not found", branch)));
        }
        Ok(())
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        self.record(format!("fetch {}", remote));
        let mut repo = self.repo.lock();
        if remote != REMOTE || !repo.remote_configured {
            return Err(fail("fetch", &format!("'{}' does not appear to be a git repository", remote)));
        }
        repo.tracking = repo.remote_branches.clone();
        Ok(())
    }

    fn fast_forward(&self, _remote: &str, branch: &str) -> Result<SyncState> {
        let mut repo = self.repo.lock();
        let Some(upstream) = repo.tracking.get(branch).cloned() else {
            return Ok(SyncState::MissingRemote);
        };
        let local = repo
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| fail("rev-parse", "unknown branch"))?;

        if local == upstream {
            return Ok(SyncState::UpToDate);
        }
        if repo.is_ancestor(&local, &upstream) {
            if repo.head.as_deref() == Some(branch) {
                repo.move_head_hard(&upstream);
            } else {
                repo.branches.insert(branch.to_string(), upstream);
            }
            repo.commands.push(format!("fast-forward {}", branch));
            return Ok(SyncState::FastForwarded);
        }
        if repo.is_ancestor(&upstream, &local) {
            return Ok(SyncState::Ahead);
        }
        Ok(SyncState::Diverged)
    }

    fn rebase(&self, onto: &str) -> Result<RebaseResult> {
        self.record(format!("rebase {}", onto));
        let mut repo = self.repo.lock();
        let tip = repo.head_id().ok_or_else(|| fail("rebase", "no HEAD"))?;
        let onto_id = repo
            .resolve(onto)
            .ok_or_else(|| fail("rebase", &format!("invalid upstream '{}'", onto)))?;

        if repo.is_ancestor(&onto_id, &tip) {
            return Ok(RebaseResult::Clean);
        }
        if repo.is_ancestor(&tip, &onto_id) {
            repo.move_head_hard(&onto_id);
            return Ok(RebaseResult::Clean);
        }

        let base = repo.merge_base(&tip, &onto_id);
        let mut to_replay: Vec<String> = repo
            .ancestry(&tip)
            .into_iter()
            .take_while(|id| Some(id) != base.as_ref())
            .collect();
        to_replay.reverse();

        let mut new_parent = onto_id;
        for id in to_replay {
            let commit = repo.commits[&id].clone();
            let parent_tree = repo.tree_of(commit.parent.as_deref());
            let changes = diff_trees(&parent_tree, &commit.tree);
            let target = repo.tree_of(Some(&new_parent));

            let clashes = conflicts(&parent_tree, &target, &changes);
            if !clashes.is_empty() {
                repo.in_progress = Some(InProgress::Rebase);
                repo.unmerged = clashes;
                return Ok(RebaseResult::Conflict);
            }

            let new_tree = apply(&target, &changes);
            if new_tree == target {
                // Already upstream; dropped
                continue;
            }
            new_parent = repo.new_commit(Some(new_parent), &commit.message, new_tree);
        }

        repo.move_head_hard(&new_parent);
        Ok(RebaseResult::Clean)
    }

    fn rebase_abort(&self) -> Result<()> {
        self.record("rebase --abort".to_string());
        let mut repo = self.repo.lock();
        if repo.in_progress != Some(InProgress::Rebase) {
            return Err(fail("rebase", "No rebase in progress?"));
        }
        repo.in_progress = None;
        repo.unmerged.clear();
        let tree = repo.head_tree();
        repo.index = tree.clone();
        repo.worktree = tree;
        Ok(())
    }

    fn stage_all(&self) -> Result<()> {
        let mut repo = self.repo.lock();
        repo.index = repo.worktree.clone();
        Ok(())
    }

    fn staged_paths(&self) -> Result<Vec<String>> {
        let repo = self.repo.lock();
        Ok(diff_trees(&repo.head_tree(), &repo.index).into_keys().collect())
    }

    fn unstage_all(&self) -> Result<()> {
        self.record("reset".to_string());
        let mut repo = self.repo.lock();
        repo.index = repo.head_tree();
        Ok(())
    }

    fn commit(&self, message: &str, amend: bool) -> Result<()> {
        self.record(format!("commit{} {}", if amend { " --amend" } else { "" }, message));
        let mut repo = self.repo.lock();
        let head = repo.head_id();
        let tree = repo.index.clone();

        let parent = if amend {
            let head = head.as_deref().ok_or_else(|| fail("commit", "nothing to amend"))?;
            repo.commits[head].parent.clone()
        } else {
            if tree == repo.head_tree() {
                return Err(fail("commit", "nothing to commit, working tree clean"));
            }
            head
        };

        let id = repo.new_commit(parent, message, tree);
        match repo.head.clone() {
            Some(branch) => {
                repo.branches.insert(branch, id);
            }
            None => repo.detached = Some(id),
        }
        Ok(())
    }

    fn squash_merge(&self, branch: &str) -> Result<()> {
        self.record(format!("merge --squash {}", branch));
        let mut repo = self.repo.lock();
        let head = repo.head_id().ok_or_else(|| fail("merge", "no HEAD"))?;
        let other = repo
            .resolve(branch)
            .ok_or_else(|| fail("merge", &format!("{} - not something we can merge", branch)))?;

        let base = repo.merge_base(&head, &other);
        let base_tree = repo.tree_of(base.as_deref());
        let changes = diff_trees(&base_tree, &repo.tree_of(Some(&other)));
        let head_tree = repo.head_tree();
        if !conflicts(&base_tree, &head_tree, &changes).is_empty() {
            return Err(fail("merge", "Automatic merge failed; fix conflicts"));
        }

        repo.index = apply(&repo.index, &changes);
        repo.worktree = apply(&repo.worktree, &changes);
        Ok(())
    }

    fn reset(&self, rev: &str, mode: ResetMode) -> Result<()> {
        self.record(format!("reset {:?} {}", mode, rev));
        let mut repo = self.repo.lock();
        let id = repo
            .resolve(rev)
            .ok_or_else(|| fail("reset", &format!("unknown revision '{}'", rev)))?;
        match mode {
            ResetMode::Hard => repo.move_head_hard(&id),
            ResetMode::Soft => match repo.head.clone() {
                Some(branch) => {
                    repo.branches.insert(branch, id);
                }
                None => repo.detached = Some(id),
            },
        }
        Ok(())
    }

    fn push(
        &self,
        remote: &str,
        branch: &str,
        mode: PushMode,
        _set_upstream: bool,
    ) -> Result<PushResult> {
        self.record(format!("push {} {}", remote, branch));
        let mut repo = self.repo.lock();
        if remote != REMOTE || !repo.remote_configured {
            return Err(fail("push", &format!("'{}' does not appear to be a git repository", remote)));
        }
        let local = repo
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| fail("push", &format!("src refspec {} does not match any", branch)))?;

        if repo.reject_pushes {
            return Ok(PushResult::Rejected("[remote rejected] (pre-receive hook declined)".into()));
        }

        let current = repo.remote_branches.get(branch).cloned();
        match &mode {
            PushMode::FastForward => {
                if let Some(current) = &current {
                    if !repo.is_ancestor(current, &local) {
                        return Ok(PushResult::Rejected("[rejected] (non-fast-forward)".into()));
                    }
                }
            }
            PushMode::Lease { expected } => {
                if current != *expected {
                    return Ok(PushResult::Rejected("[rejected] (stale info)".into()));
                }
            }
        }

        repo.remote_branches.insert(branch.to_string(), local.clone());
        repo.tracking.insert(branch.to_string(), local);
        repo.pushes.push(branch.to_string());
        Ok(PushResult::Pushed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_repo_is_clean_and_published() {
        let fake = FakeBackend::new();
        assert!(fake.status().unwrap().is_clean());
        assert_eq!(fake.branch_tip("main"), fake.remote_tip("main"));
        assert_eq!(fake.current_branch().unwrap().as_deref(), Some("main"));
    }

    #[test]
    fn test_status_codes() {
        let fake = FakeBackend::new();
        fake.write("README.md", "changed\n");
        fake.write("new.txt", "new\n");
        let status = fake.status().unwrap();
        assert_eq!(status.raw(), " M README.md\n?? new.txt\n");

        fake.stage_all().unwrap();
        assert_eq!(fake.status().unwrap().raw(), "M  README.md\nA  new.txt\n");
    }

    #[test]
    fn test_delete_branch_refuses_checked_out() {
        let fake = FakeBackend::new();
        fake.create_branch("topic", "main").unwrap();
        assert!(fake.delete_branch("topic").is_err());

        fake.checkout("main").unwrap();
        fake.delete_branch("topic").unwrap();
        assert!(!fake.branch_exists("topic").unwrap());
    }

    #[test]
    fn test_stash_roundtrip() {
        let fake = FakeBackend::new();
        fake.write("new.txt", "new\n");
        assert!(fake.stash_push("test").unwrap());
        assert!(fake.is_clean());
        fake.stash_pop().unwrap();
        assert_eq!(fake.read("new.txt").as_deref(), Some("new\n"));
        assert_eq!(fake.untracked_files().unwrap(), vec!["new.txt"]);
    }

    #[test]
    fn test_rebase_drops_already_upstream_changes() {
        let fake = FakeBackend::new();
        fake.create_branch("topic", "main").unwrap();
        fake.local_commit("a.txt", "a\n", "topic change");

        fake.checkout("main").unwrap();
        fake.local_commit("a.txt", "a\n", "same change on main");

        fake.checkout("topic").unwrap();
        assert_eq!(fake.rebase("main").unwrap(), RebaseResult::Clean);
        assert_eq!(fake.branch_tip("topic"), fake.branch_tip("main"));
    }

    #[test]
    fn test_rebase_conflict_marks_in_progress() {
        let fake = FakeBackend::new();
        fake.create_branch("topic", "main").unwrap();
        fake.local_commit("README.md", "topic\n", "topic edit");
        fake.checkout("main").unwrap();
        fake.local_commit("README.md", "main\n", "main edit");
        fake.checkout("topic").unwrap();

        assert_eq!(fake.rebase("main").unwrap(), RebaseResult::Conflict);
        assert_eq!(fake.in_progress().unwrap(), Some(InProgress::Rebase));
        fake.rebase_abort().unwrap();
        assert_eq!(fake.in_progress().unwrap(), None);
    }

    #[test]
    fn test_lease_push() {
        let fake = FakeBackend::new();
        fake.create_branch("me/wip", "main").unwrap();
        fake.local_commit("a.txt", "a\n", "wip");

        let pushed = fake
            .push("origin", "me/wip", PushMode::Lease { expected: None }, true)
            .unwrap();
        assert_eq!(pushed, PushResult::Pushed);

        let stale = fake
            .push("origin", "me/wip", PushMode::Lease { expected: None }, false)
            .unwrap();
        assert!(matches!(stale, PushResult::Rejected(_)));
    }

    #[test]
    fn test_fast_forward_after_remote_commit() {
        let fake = FakeBackend::new();
        fake.remote_commit("main", "b.txt", "b\n", "from elsewhere");
        fake.fetch("origin").unwrap();
        assert_eq!(fake.fast_forward("origin", "main").unwrap(), SyncState::FastForwarded);
        assert_eq!(fake.read("b.txt").as_deref(), Some("b\n"));
    }

    #[test]
    fn test_checkout_refuses_to_clobber_local_edits() {
        let fake = FakeBackend::new();
        fake.create_branch("topic", "main").unwrap();
        fake.local_commit("README.md", "topic\n", "topic edit");
        fake.write("README.md", "dirty\n");
        assert!(fake.checkout("main").is_err());
        assert_eq!(fake.current_branch().unwrap().as_deref(), Some("topic"));
    }
}
