//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// CLI helper for LoadForge
#[derive(Parser, Debug)]
#[command(name = "lf", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no log output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pull all LoadForge test scripts (locustfiles) into local folders
    Pull(PullArgs),

    /// Push local test folders to LoadForge by unique name
    Push(PushArgs),

    /// Start a run by test slug (name); prints the run id to stdout
    Start(StartArgs),

    /// Wait for a run/result to finish; exits 0 on success
    Wait(WaitArgs),

    /// Scaffold a new test folder with config and locustfile
    Create(CreateArgs),
}

#[derive(Args, Debug)]
pub struct PullArgs {
    /// Output directory
    #[arg(short, long, default_value = "tests")]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Directory to scan
    #[arg(long, default_value = "tests")]
    pub dir: PathBuf,

    /// Show the plan only; mutate nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Create tests that do not exist remotely
    #[arg(long)]
    pub allow_create: bool,

    /// Delete remote tests not present locally
    #[arg(long)]
    pub allow_delete: bool,

    /// Do not send extended quality-target fields
    ///
    /// By default extended fields are sent and the push falls back to the
    /// base field set when the API rejects them with a 400.
    #[arg(long)]
    pub no_extended: bool,
}

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Test slug (unique name)
    pub slug: String,

    /// Duration in minutes (clamped to 2-720)
    #[arg(short, long, default_value_t = 5)]
    pub duration: u32,
}

#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Run/result id to wait for
    pub id: String,

    /// Polling interval in seconds
    #[arg(short, long, default_value_t = 5)]
    pub interval: u64,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Test name (slug); prompted for when omitted
    #[arg(short, long)]
    pub name: Option<String>,

    /// Users (number); prompted for when omitted
    #[arg(short, long)]
    pub users: Option<String>,

    /// Host as protocol://url:port; offered interactively when omitted
    #[arg(long)]
    pub host: Option<String>,

    /// Output directory
    #[arg(short, long, default_value = "tests")]
    pub out: PathBuf,
}
