//! `rp checkpoint` against a real repository

use crate::common::TestRepo;
use crate::rp;
use anyhow::Result;

#[test]
fn test_checkpoint_creates_rolling_commit() -> Result<()> {
    let repo = TestRepo::new();
    repo.write("src/lib.rs", "pub fn answer() -> u32 { 42 }\n");

    let result = rp!(&repo.work, "checkpoint", "first", "pass").assert_success()?;
    assert!(result.contains_stdout("Checkpoint created"));

    assert_eq!(repo.current_branch(), "me/wip");
    let subject = repo.subject("me/wip");
    assert!(subject.starts_with("wip: "), "subject: {}", subject);
    assert!(subject.ends_with(" · first pass"), "subject: {}", subject);
    assert_eq!(repo.count("main..me/wip"), 1);
    assert_eq!(repo.remote_rev("me/wip"), repo.rev("me/wip"));
    assert_eq!(repo.status(), "");
    assert_eq!(repo.stash_count(), 0);
    assert_eq!(
        repo.read("src/lib.rs").as_deref(),
        Some("pub fn answer() -> u32 { 42 }\n")
    );
    Ok(())
}

#[test]
fn test_repeated_checkpoints_amend() -> Result<()> {
    let repo = TestRepo::new();

    repo.write("notes.md", "one\n");
    rp!(&repo.work, "checkpoint").assert_success()?;
    repo.write("notes.md", "two\n");
    let result = rp!(&repo.work, "checkpoint").assert_success()?;
    assert!(result.contains_stdout("Checkpoint amended"));
    repo.write("README.md", "edited\n");
    rp!(&repo.work, "checkpoint").assert_success()?;

    assert_eq!(repo.count("main..me/wip"), 1);
    assert!(repo.subject("me/wip").starts_with("wip: "));
    assert_eq!(repo.remote_rev("me/wip"), repo.rev("me/wip"));
    assert_eq!(repo.remote_rev("main"), repo.rev("main"));
    Ok(())
}

#[test]
fn test_checkpoint_without_edits_skips() -> Result<()> {
    let repo = TestRepo::new();
    repo.write("a.txt", "a\n");
    rp!(&repo.work, "checkpoint").assert_success()?;
    let tip = repo.rev("me/wip");

    let result = rp!(&repo.work, "checkpoint").assert_success()?;
    assert!(result.contains_stdout("nothing to checkpoint"));
    assert_eq!(repo.rev("me/wip"), tip);
    assert_eq!(repo.remote_rev("me/wip"), tip);
    Ok(())
}

#[test]
fn test_secret_file_aborts() -> Result<()> {
    let repo = TestRepo::new();
    repo.write(".env", "API_TOKEN=hunter2\n");
    repo.write("app.rs", "fn main() {}\n");

    let result = rp!(&repo.work, "checkpoint").assert_failure()?;
    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr(".env"));

    assert_eq!(repo.current_branch(), "main");
    assert_eq!(repo.git(&["diff", "--cached", "--name-only"]), "");
    assert_eq!(repo.read(".env").as_deref(), Some("API_TOKEN=hunter2\n"));
    assert_eq!(repo.read("app.rs").as_deref(), Some("fn main() {}\n"));
    assert_eq!(repo.stash_count(), 0);
    assert!(repo.git(&["branch", "--list", "me/wip"]).is_empty());
    Ok(())
}

#[test]
fn test_private_key_aborts() -> Result<()> {
    let repo = TestRepo::new();
    repo.write("deploy/server.PEM", "-----BEGIN-----\n");

    let result = rp!(&repo.work, "checkpoint").assert_failure()?;
    assert!(result.contains_stderr("server.PEM"));
    assert_eq!(repo.git(&["diff", "--cached", "--name-only"]), "");
    Ok(())
}

#[test]
fn test_label_from_environment() -> Result<()> {
    let repo = TestRepo::new();
    repo.write("a.txt", "a\n");

    rp!(&repo.work, "checkpoint")
        .env("ROLLPOINT_LABEL", "from env")
        .assert_success()?;
    assert!(repo.subject("me/wip").ends_with(" · from env"));
    Ok(())
}

#[test]
fn test_wip_branch_override() -> Result<()> {
    let repo = TestRepo::new();
    repo.write("a.txt", "a\n");

    rp!(&repo.work, "--wip-branch", "me/alt", "checkpoint")
        .env("ROLLPOINT_WIP_BRANCH", "me/ignored")
        .assert_success()?;
    assert_eq!(repo.current_branch(), "me/alt");
    assert_eq!(repo.remote_rev("me/alt"), repo.rev("me/alt"));
    Ok(())
}

#[test]
fn test_concurrent_push_is_rejected() -> Result<()> {
    let repo = TestRepo::new();
    repo.write("a.txt", "one\n");
    rp!(&repo.work, "checkpoint").assert_success()?;
    let ours = repo.rev("me/wip");

    // Another machine moves the remote WIP branch
    let other = repo.clone_as("other");
    crate::common::repo::git(&other, &["checkout", "--quiet", "me/wip"]);
    std::fs::write(other.join("b.txt"), "other\n")?;
    crate::common::repo::git(&other, &["add", "b.txt"]);
    crate::common::repo::git(&other, &["commit", "--quiet", "-m", "wip: 2026-01-01T00:00:00Z · other"]);
    crate::common::repo::git(&other, &["push", "--quiet", "origin", "me/wip"]);
    let theirs = repo.remote_rev("me/wip");

    repo.write("a.txt", "two\n");
    let result = rp!(&repo.work, "checkpoint").assert_failure()?;
    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("rejected"));

    assert_eq!(repo.remote_rev("me/wip"), theirs);
    assert_eq!(repo.rev("me/wip"), ours);
    assert_eq!(repo.read("a.txt").as_deref(), Some("two\n"));
    assert_eq!(repo.git(&["diff", "--cached", "--name-only"]), "");
    Ok(())
}

#[test]
fn test_unfinished_merge_skips() -> Result<()> {
    let repo = TestRepo::new();
    repo.write("a.txt", "a\n");
    let head = repo.rev("HEAD");
    std::fs::write(repo.work.join(".git").join("MERGE_HEAD"), format!("{}\n", head))?;

    let result = rp!(&repo.work, "checkpoint").assert_success()?;
    assert!(result.contains_stdout("git merge --abort"));
    assert_eq!(repo.current_branch(), "main");
    assert!(repo.git(&["branch", "--list", "me/wip"]).is_empty());
    Ok(())
}

#[test]
fn test_missing_remote_skips() -> Result<()> {
    let repo = TestRepo::new();
    repo.git(&["remote", "remove", "origin"]);
    repo.write("a.txt", "a\n");

    let result = rp!(&repo.work, "checkpoint").assert_success()?;
    assert!(result.contains_stdout("no remote named 'origin'"));
    assert_eq!(repo.read("a.txt").as_deref(), Some("a\n"));
    Ok(())
}

#[test]
fn test_outside_repository_fails() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let result = rp!(dir.path(), "checkpoint").assert_failure()?;
    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("Not inside a git repository"));
    Ok(())
}
