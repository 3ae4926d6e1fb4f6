//! Run the checkpoint operation once

use crate::util::{self, Overrides};
use anyhow::Result;
use owo_colors::OwoColorize;
use rp_core::config::env_label;
use rp_ops::Workflow;
use std::process::ExitCode;

pub async fn run(label: Option<String>, overrides: &Overrides) -> Result<ExitCode> {
    // 1. Find repository and effective configuration
    let repo = util::open_repo()?;
    let config = util::load_config(Some(repo.root()), overrides)?;

    // 2. Label: argument first, then ROLLPOINT_LABEL
    let label = label.or_else(|| env_label(|key| std::env::var(key).ok()));

    // 3. Checkpoint
    let workflow = Workflow::from_config(&repo, &config)?;
    let outcome = workflow.checkpoint(label.as_deref());

    util::print_outcome(&outcome, |summary| {
        format!(
            "Checkpoint {} on {} ({}, {})\n  {}",
            if summary.amended { "amended" } else { "created" },
            summary.branch.cyan(),
            util::short_id(&summary.commit),
            util::plural(summary.files, "file"),
            summary.message.dimmed()
        )
    });

    Ok(ExitCode::from(outcome.exit_code()))
}
