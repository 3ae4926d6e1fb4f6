//! Run the promotion operation once

use crate::util::{self, Overrides};
use anyhow::Result;
use owo_colors::OwoColorize;
use rp_ops::Workflow;
use std::process::ExitCode;

pub async fn run(message: Option<String>, overrides: &Overrides) -> Result<ExitCode> {
    // 1. A message is mandatory
    let Some(message) = message else {
        eprintln!("{} a commit message is required", "error:".red().bold());
        eprintln!("  {} rp promote \"feat: describe the change\"", "usage:".dimmed());
        return Ok(ExitCode::from(1));
    };

    // 2. Find repository and effective configuration
    let repo = util::open_repo()?;
    let config = util::load_config(Some(repo.root()), overrides)?;

    // 3. Promote
    let workflow = Workflow::from_config(&repo, &config)?;
    let outcome = workflow.promote(&message);

    util::print_outcome(&outcome, |summary| {
        format!(
            "Promoted to {} ({}, {}); {} reset",
            summary.trunk.cyan(),
            util::short_id(&summary.commit),
            util::plural(summary.files, "file"),
            config.branches.wip.cyan()
        )
    });

    Ok(ExitCode::from(outcome.exit_code()))
}
