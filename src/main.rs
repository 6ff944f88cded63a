// ABOUTME: Entry point for the swatch CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Operation};
use std::env;
use swatch::config::Config;
use swatch::error::{Error, Result};
use swatch::output::{Output, OutputMode};
use swatch::types::Environment;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Argument errors exit 1 like every other failure; help and version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Initialize tracing subscriber based on verbose flag
    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, mode).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let environment: Environment = cli
        .environment
        .parse()
        .map_err(|e: swatch::types::ParseEnvironmentError| Error::InvalidArguments(e.to_string()))?;

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(&env::current_dir()?)?,
    };
    let settings = config.for_environment(environment)?;
    let output = Output::new(mode);

    match cli.operation() {
        Operation::Status => commands::status(settings, output).await,
        Operation::Rollback => commands::rollback(settings, cli.force, output).await,
        Operation::Deploy => {
            let options = commands::DeployOptions {
                color: cli.color,
                yes: cli.yes,
                force: cli.force,
            };
            commands::deploy(settings, options, output).await
        }
    }
}
