//! Scratch git repositories: a bare remote plus working clones

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub struct TestRepo {
    _temp: TempDir,
    pub remote: PathBuf,
    pub work: PathBuf,
}

/// Run git in `dir`, panicking on failure; returns trimmed stdout
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .env("LC_ALL", "C")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.name", "Test"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

impl TestRepo {
    /// Remote with `main` holding one commit, cloned into `work`
    pub fn new() -> Self {
        let temp = TempDir::new().expect("tempdir");
        let remote = temp.path().join("remote.git");
        let work = temp.path().join("work");
        std::fs::create_dir_all(&remote).unwrap();
        std::fs::create_dir_all(&work).unwrap();

        git(&remote, &["init", "--bare", "--quiet"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&work, &["init", "--quiet"]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        configure_identity(&work);
        git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);
        std::fs::write(work.join("README.md"), "hello\n").unwrap();
        git(&work, &["add", "README.md"]);
        git(&work, &["commit", "--quiet", "-m", "initial"]);
        git(&work, &["push", "--quiet", "-u", "origin", "main"]);

        Self {
            _temp: temp,
            remote,
            work,
        }
    }

    /// Another clone of the remote, as a second machine would have
    pub fn clone_as(&self, name: &str) -> PathBuf {
        let dir = self.remote.parent().unwrap().join(name);
        git(
            self.remote.parent().unwrap(),
            &["clone", "--quiet", self.remote.to_str().unwrap(), name],
        );
        configure_identity(&dir);
        dir
    }

    pub fn git(&self, args: &[&str]) -> String {
        git(&self.work, args)
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.work.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    pub fn read(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.work.join(path)).ok()
    }

    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Commit id of `rev` in the working clone
    pub fn rev(&self, rev: &str) -> String {
        self.git(&["rev-parse", rev])
    }

    /// Commit id of `branch` on the remote
    pub fn remote_rev(&self, branch: &str) -> String {
        git(&self.remote, &["rev-parse", &format!("refs/heads/{}", branch)])
    }

    pub fn subject(&self, rev: &str) -> String {
        self.git(&["log", "-1", "--format=%s", rev])
    }

    pub fn count(&self, range: &str) -> usize {
        self.git(&["rev-list", "--count", range]).parse().unwrap()
    }

    pub fn status(&self) -> String {
        self.git(&["status", "--porcelain"])
    }

    pub fn stash_count(&self) -> usize {
        let list = self.git(&["stash", "list"]);
        list.lines().filter(|l| !l.is_empty()).count()
    }
}
