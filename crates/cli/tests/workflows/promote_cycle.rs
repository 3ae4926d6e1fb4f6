//! `rp promote` against a real repository

use crate::common::TestRepo;
use crate::rp;
use anyhow::Result;

/// Repository with one pushed checkpoint and a clean tree on the WIP branch
fn checkpointed() -> Result<TestRepo> {
    let repo = TestRepo::new();
    repo.write("feature.rs", "pub fn x() {}\n");
    rp!(&repo.work, "checkpoint", "x").assert_success()?;
    Ok(repo)
}

#[test]
fn test_promote_squashes_into_trunk() -> Result<()> {
    let repo = checkpointed()?;
    let trunk_before = repo.rev("main");

    let result = rp!(&repo.work, "promote", "feat: x").assert_success()?;
    assert!(result.contains_stdout("Promoted to"));

    assert_eq!(repo.subject("main"), "feat: x");
    assert_eq!(repo.count(&format!("{}..main", trunk_before)), 1);
    assert_eq!(repo.rev("me/wip"), repo.rev("main"));
    assert_eq!(repo.remote_rev("main"), repo.rev("main"));
    assert_eq!(repo.remote_rev("me/wip"), repo.rev("main"));
    assert_eq!(
        repo.git(&["show", "main:feature.rs"]),
        "pub fn x() {}"
    );
    Ok(())
}

#[test]
fn test_promote_message_from_several_words() -> Result<()> {
    let repo = checkpointed()?;
    rp!(&repo.work, "promote", "feat:", "add", "x").assert_success()?;
    assert_eq!(repo.subject("main"), "feat: add x");
    Ok(())
}

#[test]
fn test_promote_requires_message() -> Result<()> {
    let repo = checkpointed()?;
    let trunk = repo.rev("main");

    let result = rp!(&repo.work, "promote").assert_failure()?;
    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("commit message is required"));
    assert_eq!(repo.rev("main"), trunk);
    Ok(())
}

#[test]
fn test_promote_refuses_non_wip_tip() -> Result<()> {
    let repo = TestRepo::new();
    repo.git(&["checkout", "--quiet", "-b", "me/wip"]);
    repo.write("manual.txt", "m\n");
    repo.git(&["add", "manual.txt"]);
    repo.git(&["commit", "--quiet", "-m", "manual commit"]);
    let trunk = repo.rev("main");

    let result = rp!(&repo.work, "promote", "feat: x").assert_failure()?;
    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("not a WIP checkpoint"));
    assert_eq!(repo.rev("main"), trunk);
    assert_eq!(repo.remote_rev("main"), trunk);
    Ok(())
}

#[test]
fn test_promote_refuses_dirty_tree() -> Result<()> {
    let repo = checkpointed()?;
    repo.write("scratch.txt", "draft\n");

    let result = rp!(&repo.work, "promote", "feat: x").assert_failure()?;
    assert!(result.contains_stderr("uncommitted changes"));
    assert_eq!(repo.read("scratch.txt").as_deref(), Some("draft\n"));
    assert_eq!(repo.stash_count(), 0);
    assert_eq!(repo.count("main..me/wip"), 1);
    Ok(())
}

#[test]
fn test_full_cycle_starts_fresh() -> Result<()> {
    let repo = checkpointed()?;
    rp!(&repo.work, "promote", "feat: x").assert_success()?;

    repo.write("next.rs", "pub fn y() {}\n");
    let result = rp!(&repo.work, "checkpoint", "y").assert_success()?;
    assert!(result.contains_stdout("Checkpoint created"));
    assert_eq!(repo.count("main..me/wip"), 1);
    assert!(repo.subject("me/wip").ends_with(" · y"));
    Ok(())
}

#[test]
fn test_promote_returns_to_unrelated_branch() -> Result<()> {
    let repo = checkpointed()?;
    repo.git(&["checkout", "--quiet", "-b", "topic", "main"]);

    rp!(&repo.work, "promote", "feat: x").assert_success()?;
    assert_eq!(repo.current_branch(), "topic");
    assert_eq!(repo.subject("main"), "feat: x");
    Ok(())
}
