//! Configuration layering, status output and argument handling

use crate::common::TestRepo;
use crate::rp;
use anyhow::Result;

#[test]
fn test_config_defaults() -> Result<()> {
    let repo = TestRepo::new();
    let result = rp!(&repo.work, "config", "get", "branches.wip").assert_success()?;
    assert_eq!(result.stdout.trim(), "me/wip");
    let result = rp!(&repo.work, "config", "get", "watch.poll_interval_secs").assert_success()?;
    assert_eq!(result.stdout.trim(), "5");
    Ok(())
}

#[test]
fn test_config_layers() -> Result<()> {
    let repo = TestRepo::new();
    repo.write(".rollpoint.toml", "[watch]\ndebounce_secs = 7\n\n[branches]\nwip = \"me/file\"\n");

    let result = rp!(&repo.work, "config", "get", "watch.debounce_secs").assert_success()?;
    assert_eq!(result.stdout.trim(), "7");

    // Environment beats the repository file
    let result = rp!(&repo.work, "config", "get", "branches.wip")
        .env("ROLLPOINT_WIP_BRANCH", "me/env")
        .assert_success()?;
    assert_eq!(result.stdout.trim(), "me/env");

    // Flags beat the environment
    let result = rp!(&repo.work, "--wip-branch", "me/flag", "config", "get", "branches.wip")
        .env("ROLLPOINT_WIP_BRANCH", "me/env")
        .assert_success()?;
    assert_eq!(result.stdout.trim(), "me/flag");
    Ok(())
}

#[test]
fn test_invalid_environment_value_fails() -> Result<()> {
    let repo = TestRepo::new();
    let result = rp!(&repo.work, "config", "get", "watch.debounce_secs")
        .env("ROLLPOINT_DEBOUNCE_SECS", "soon")
        .assert_failure()?;
    assert!(result.contains_stderr("ROLLPOINT_DEBOUNCE_SECS"));
    Ok(())
}

#[test]
fn test_unknown_config_key_fails() -> Result<()> {
    let repo = TestRepo::new();
    let result = rp!(&repo.work, "config", "get", "daemon.interval").assert_failure()?;
    assert!(result.contains_stderr("Unknown config key"));
    Ok(())
}

#[test]
fn test_config_example_and_path() -> Result<()> {
    let repo = TestRepo::new();
    let result = rp!(&repo.work, "config", "example").assert_success()?;
    assert!(result.contains_stdout("[watch]"));
    assert!(result.contains_stdout("debounce_secs"));

    let result = rp!(&repo.work, "config", "path").assert_success()?;
    assert!(result.contains_stdout(".rollpoint.toml"));
    Ok(())
}

#[test]
fn test_status_json_after_checkpoint() -> Result<()> {
    let repo = TestRepo::new();
    repo.write("a.txt", "a\n");
    rp!(&repo.work, "checkpoint").assert_success()?;

    let result = rp!(&repo.work, "status", "--json").assert_success()?;
    let value: serde_json::Value = serde_json::from_str(&result.stdout)?;
    assert_eq!(value["branch"], "me/wip");
    assert_eq!(value["rolling"], true);
    assert_eq!(value["published"], true);
    assert_eq!(value["wip"]["ahead"], 1);
    assert_eq!(value["preflight"]["verdict"], "proceed");
    assert_eq!(value["changed_paths"], 0);
    Ok(())
}

#[test]
fn test_status_is_read_only() -> Result<()> {
    let repo = TestRepo::new();
    repo.write("a.txt", "a\n");
    let head = repo.rev("HEAD");

    let result = rp!(&repo.work, "status").assert_success()?;
    assert!(result.contains_stdout("Rollpoint Status"));
    assert_eq!(repo.rev("HEAD"), head);
    assert_eq!(repo.status(), "?? a.txt");
    Ok(())
}
