//! `rp watch` checkpointing on its own

use crate::common::cli::RpCommand;
use crate::common::TestRepo;
use anyhow::Result;
use std::time::{Duration, Instant};

#[test]
fn test_watch_checkpoints_settled_edits() -> Result<()> {
    let repo = TestRepo::new();
    repo.write("draft.md", "settled\n");

    let mut child = RpCommand::new(&repo.work)
        .args(&["watch", "--poll", "1", "--debounce", "1"])
        .spawn()?;

    let deadline = Instant::now() + Duration::from_secs(30);
    let mut pushed = false;
    while Instant::now() < deadline {
        let remote = crate::common::repo::git(&repo.remote, &["branch", "--list", "me/wip"]);
        if !remote.is_empty() {
            pushed = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(200));
    }

    child.kill()?;
    child.wait()?;

    assert!(pushed, "watcher never pushed a checkpoint");
    assert!(repo.subject("me/wip").starts_with("wip: "));
    assert_eq!(repo.count("main..me/wip"), 1);
    assert_eq!(repo.read("draft.md").as_deref(), Some("settled\n"));
    Ok(())
}
