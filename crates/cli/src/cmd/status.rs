//! Show rolling checkpoint status

use crate::util::{self, Overrides};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rp_core::Verdict;
use rp_ops::{StatusReport, Workflow};
use std::process::ExitCode;

pub async fn run(json: bool, overrides: &Overrides) -> Result<ExitCode> {
    // 1. Find repository and effective configuration
    let repo = util::open_repo()?;
    let config = util::load_config(Some(repo.root()), overrides)?;

    // 2. Inspect (no fetch, no mutation)
    let workflow = Workflow::from_config(&repo, &config)?;
    let report = workflow.status().context("Failed to inspect repository")?;

    // 3. Display output
    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(&report))?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "Rollpoint Status".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    println!("Repository:    {}", repo.root().display().to_string().cyan());
    println!(
        "Branch:        {}",
        report.branch.as_deref().unwrap_or("(detached HEAD)")
    );
    println!("Trunk:         {} {}", report.trunk, tip(&report.trunk_tip).dimmed());
    println!("WIP branch:    {} {}", report.wip, tip(&report.wip_tip).dimmed());
    println!();

    print!("Checkpoint:    ");
    match report.wip_ahead {
        None => println!("{}", "none yet".dimmed()),
        Some(_) if report.is_rolling() => {
            let published = if report.is_published() {
                "pushed".green().to_string()
            } else {
                "not pushed".yellow().to_string()
            };
            println!("{} ({})", "1 WIP commit ahead of trunk ✓".green(), published);
        }
        Some(0) => println!("{}", "even with trunk".dimmed()),
        Some(ahead) => println!(
            "{}",
            format!("{} ahead of trunk; tip is not a single WIP checkpoint", util::plural(ahead, "commit"))
                .yellow()
        ),
    }

    print!("Guards:        ");
    match &report.preflight {
        Verdict::Proceed => println!("{}", "clear ✓".green()),
        Verdict::Skip(reason) => println!("{} {}", "blocked:".yellow(), reason),
        Verdict::Abort(abort) => println!("{} {}", "blocked:".red(), abort),
    }

    println!("Changes:       {}", util::plural(report.changed_paths, "path"));

    Ok(ExitCode::SUCCESS)
}

fn tip(id: &Option<String>) -> String {
    match id {
        Some(id) => util::short_id(id).to_string(),
        None => "(missing)".to_string(),
    }
}

fn to_json(report: &StatusReport) -> serde_json::Value {
    let preflight = match &report.preflight {
        Verdict::Proceed => serde_json::json!({ "verdict": "proceed" }),
        Verdict::Skip(reason) => serde_json::json!({ "verdict": "skip", "reason": reason }),
        Verdict::Abort(abort) => serde_json::json!({
            "verdict": "abort",
            "reason": abort.reason,
            "remedy": abort.remedy,
        }),
    };

    serde_json::json!({
        "branch": report.branch,
        "trunk": { "name": report.trunk, "tip": report.trunk_tip },
        "wip": {
            "name": report.wip,
            "tip": report.wip_tip,
            "remote_tip": report.wip_remote_tip,
            "ahead": report.wip_ahead,
            "tip_is_checkpoint": report.wip_tip_is_checkpoint,
        },
        "rolling": report.is_rolling(),
        "published": report.is_published(),
        "preflight": preflight,
        "changed_paths": report.changed_paths,
    })
}
