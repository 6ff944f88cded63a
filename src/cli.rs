// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: One flat set of flags; --status and --rollback select the operation.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "swatch")]
#[command(about = "Blue-green deployments for docker compose projects")]
#[command(version)]
pub struct Cli {
    /// Target environment (staging or prod)
    #[arg(long = "env", value_name = "ENV")]
    pub environment: String,

    /// Color to deploy in production (blue or green); defaults to the inactive color
    #[arg(long)]
    pub color: Option<String>,

    /// Switch traffic back to the inactive color
    #[arg(long)]
    pub rollback: bool,

    /// Show the environment's status and exit
    #[arg(long)]
    pub status: bool,

    /// Configuration file (default: swatch.yml in the current directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Approve confirmation prompts without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Break an existing state lock
    #[arg(long)]
    pub force: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Operation selected by the flags, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Status,
    Rollback,
    Deploy,
}

impl Cli {
    pub fn operation(&self) -> Operation {
        if self.status {
            Operation::Status
        } else if self.rollback {
            Operation::Rollback
        } else {
            Operation::Deploy
        }
    }
}
