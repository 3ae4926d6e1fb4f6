//! Watch the working tree and checkpoint when edits settle

use crate::util::{self, Overrides};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rp_core::config::env_label;
use rp_ops::{CheckpointSummary, Workflow};
use rp_watcher::{PollEvent, Watcher};
use std::process::ExitCode;
use tokio::sync::watch;

/// Changed paths listed before collapsing into "+N more"
const MAX_LISTED_PATHS: usize = 5;

pub async fn run(overrides: &Overrides) -> Result<ExitCode> {
    // 1. Find repository and effective configuration
    let repo = util::open_repo()?;
    let config = util::load_config(Some(repo.root()), overrides)?;
    let label = env_label(|key| std::env::var(key).ok());
    let workflow = Workflow::from_config(&repo, &config)?;

    // 2. Stop between polls on Ctrl-C
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    println!(
        "{} {} (poll {}s, debounce {}s, branch {})",
        "Watching".bold(),
        repo.root().display().to_string().cyan(),
        config.watch.poll_interval_secs,
        config.watch.debounce_secs,
        config.branches.wip.cyan()
    );

    // 3. Poll until interrupted
    let mut watcher = Watcher::new(&repo, config.watch.poll_interval(), config.watch.debounce());
    let mut renderer = Renderer::default();
    watcher
        .run(
            shutdown_rx,
            || workflow.checkpoint(label.as_deref()),
            |event| renderer.render(event),
        )
        .await
        .context("Watch loop failed")?;

    println!("{}", "Stopped watching.".dimmed());
    Ok(ExitCode::SUCCESS)
}

/// Prints each transition once; the countdown prints every poll
#[derive(Default)]
struct Renderer {
    last: Option<&'static str>,
}

impl Renderer {
    fn render(&mut self, event: &PollEvent<CheckpointSummary>) {
        let kind = match event {
            PollEvent::Idle => "idle",
            PollEvent::Changed { .. } => "changed",
            PollEvent::Settling => "settling",
            PollEvent::Edited => "edited",
            PollEvent::Waiting { .. } => "waiting",
            PollEvent::Fired(_) => "fired",
            PollEvent::Held => "held",
        };
        let repeated = self.last == Some(kind);
        self.last = Some(kind);

        match event {
            PollEvent::Idle if !repeated => println!("{}", "Working tree clean.".dimmed()),
            PollEvent::Changed { paths } => {
                println!("{} {}", "Changed:".yellow(), summarize_paths(paths));
            }
            PollEvent::Settling => println!("  {}", "content captured; debounce started".dimmed()),
            PollEvent::Edited => println!("{} debounce restarted", "Edited:".yellow()),
            PollEvent::Waiting { remaining } => {
                let secs = remaining.as_secs_f64().ceil() as u64;
                println!("  {}", format!("settling, {}s left", secs).dimmed());
            }
            PollEvent::Fired(outcome) => util::print_outcome(outcome, |summary| {
                format!(
                    "Checkpoint {} on {} ({})",
                    if summary.amended { "amended" } else { "created" },
                    summary.branch.cyan(),
                    util::short_id(&summary.commit)
                )
            }),
            PollEvent::Held if !repeated => println!(
                "{}",
                "Holding: last checkpoint aborted; edit files to retry.".yellow()
            ),
            _ => {}
        }
    }
}

fn summarize_paths(paths: &[String]) -> String {
    if paths.len() <= MAX_LISTED_PATHS {
        return paths.join(", ");
    }
    format!(
        "{} (+{} more)",
        paths[..MAX_LISTED_PATHS].join(", "),
        paths.len() - MAX_LISTED_PATHS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_paths() {
        let few: Vec<String> = vec!["a".into(), "b".into()];
        assert_eq!(summarize_paths(&few), "a, b");

        let many: Vec<String> = (0..7).map(|i| format!("f{}", i)).collect();
        assert_eq!(summarize_paths(&many), "f0, f1, f2, f3, f4 (+2 more)");
    }

    #[test]
    fn test_renderer_tracks_last_kind() {
        let mut renderer = Renderer::default();
        renderer.render(&PollEvent::Idle);
        assert_eq!(renderer.last, Some("idle"));
        renderer.render(&PollEvent::Held);
        assert_eq!(renderer.last, Some("held"));
    }
}
