//! Rollpoint CLI - rp command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod cmd;
mod util;

/// Rollpoint - rolling WIP checkpoints on top of a stable trunk
#[derive(Parser)]
#[command(name = "rp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// WIP branch name (overrides config and ROLLPOINT_WIP_BRANCH)
    #[arg(long, global = true, value_name = "BRANCH")]
    wip_branch: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the working tree and checkpoint once edits settle
    Watch {
        /// Seconds between polls
        #[arg(long, value_name = "SECS")]
        poll: Option<u64>,
        /// Seconds content must stay unchanged before checkpointing
        #[arg(long, value_name = "SECS")]
        debounce: Option<u64>,
    },
    /// Create or amend the rolling WIP commit and push it
    Checkpoint {
        /// Free-text label appended to the commit message
        label: Vec<String>,
    },
    /// Squash the WIP commit into trunk and reset the WIP branch
    Promote {
        /// Commit message for the trunk commit
        message: Vec<String>,
    },
    /// Show branch tips, guard state and pending changes
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show effective configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Print one value (e.g. watch.debounce_secs)
    Get { key: String },
    /// Show config file locations
    Path,
    /// Print an annotated example config file
    Example,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    util::init_tracing(cli.verbose);

    let mut overrides = util::Overrides {
        wip_branch: cli.wip_branch,
        ..Default::default()
    };

    match cli.command {
        Commands::Watch { poll, debounce } => {
            overrides.poll_interval_secs = poll;
            overrides.debounce_secs = debounce;
            cmd::watch::run(&overrides).await
        }
        Commands::Checkpoint { label } => cmd::checkpoint::run(util::join_words(&label), &overrides).await,
        Commands::Promote { message } => cmd::promote::run(util::join_words(&message), &overrides).await,
        Commands::Status { json } => cmd::status::run(json, &overrides).await,
        Commands::Config(command) => match command {
            ConfigCommands::List => cmd::config::run_list(&overrides).await,
            ConfigCommands::Get { key } => cmd::config::run_get(&key, &overrides).await,
            ConfigCommands::Path => cmd::config::run_path().await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}
