//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Flockrun - account automation runner
#[derive(Parser)]
#[command(
    name = "flockrun",
    about = "Concurrency-limited account automation with randomized pacing",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run a task over the selected accounts
    Run {
        /// Task to run (see list-tasks)
        #[arg(value_name = "TASK")]
        task: String,
    },

    /// List the available tasks
    ListTasks,

    /// Preview the account selection without dispatching anything
    Accounts,
}
