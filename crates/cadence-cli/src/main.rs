//! Cadence CLI
//!
//! Command-line front end for the cadence task engine: tasks with
//! dependency gating, recurring templates, and the generation scheduler.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use cadence_core::{params::ListTasks, TrackerBuilder};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();

    let mut builder = TrackerBuilder::new();
    if let Some(path) = database_file {
        builder = builder.with_database_path(path);
    }
    let tracker = builder
        .build()
        .await
        .context("Failed to initialize tracker")?;
    info!("Using database at {}", tracker.database_path().display());

    let cli = Cli::new(tracker, TerminalRenderer::new(!no_color));

    match command {
        Some(Task { command }) => cli.handle_task_command(command).await,
        Some(Template { command }) => cli.handle_template_command(command).await,
        Some(Generate(args)) => cli.generate(&args).await,
        Some(Serve(args)) => {
            info!("Starting scheduler");
            cli.serve(&args).await
        }
        None => cli.list_tasks(&ListTasks::default()).await,
    }
}
