use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{GenerateArgs, ServeArgs, TaskCommands, TemplateCommands};

/// Command-line interface for the Cadence task engine
///
/// Cadence tracks tasks with prerequisites and materializes recurring tasks
/// from templates. Tasks cannot leave Todo until every prerequisite is
/// completed, and dependency edits that would close a cycle are rejected.
#[derive(Parser)]
#[command(version, about, name = "cad")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/cadence/cadence.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Cadence CLI
///
/// - `task`: tasks, their status and their dependencies
/// - `template`: recurring task templates
/// - `generate`: run one generation pass now
/// - `serve`: run the scheduler loop until interrupted
#[derive(Subcommand)]
pub enum Commands {
    /// Manage tasks and dependencies
    #[command(alias = "t")]
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage recurring templates
    #[command(alias = "tpl")]
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Generate due recurring tasks once
    #[command(alias = "g")]
    Generate(GenerateArgs),
    /// Run the recurring task scheduler in the foreground
    Serve(ServeArgs),
}
