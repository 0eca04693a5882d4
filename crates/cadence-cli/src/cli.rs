//! Command definitions and handlers for the `cad` binary.
//!
//! Argument structs carry the clap derives and convert into the
//! interface-agnostic types in [`cadence_core::params`]:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Tracker / Scheduler
//! ```
//!
//! Core types stay free of clap, and validation of statuses, priorities and
//! recurrence rules happens once, in core.

use std::time::Duration;

use anyhow::{Context, Result};
use cadence_core::{
    params::*,
    recurrence::next_occurrences,
    scheduler::{Scheduler, SchedulerConfig},
    CreateResult, DeleteResult, OperationStatus, TaskDue, Tracker, UpdateResult,
};
use clap::{Args, Subcommand, ValueEnum};
use jiff::{
    civil::{Date, Time},
    Zoned,
};
use log::{info, warn};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::renderer::TerminalRenderer;

/// Owner used when `--owner` is not given
const DEFAULT_OWNER: u64 = 1;

// ============================================================================
// Task arguments
// ============================================================================

/// Create a new task
///
/// New tasks start in Todo. Prerequisites given with `--depends-on` must
/// already exist and belong to the same owner.
#[derive(Args)]
pub struct AddTaskArgs {
    /// Name of the task
    pub name: String,
    #[arg(long, default_value_t = DEFAULT_OWNER, help = "Owner of the task")]
    pub owner: u64,
    #[arg(long, help = "Project the task belongs to")]
    pub project: Option<u64>,
    #[arg(short, long, help = "Longer description of the task")]
    pub description: Option<String>,
    #[arg(short, long, value_enum, help = "Priority of the task")]
    pub priority: Option<PriorityArg>,
    #[arg(short, long, help = "Free-form category label")]
    pub category: Option<String>,
    #[arg(long, help = "Due date (YYYY-MM-DD)")]
    pub due_date: Option<Date>,
    #[arg(long, help = "Due time (HH:MM)")]
    pub due_time: Option<Time>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "IDs of prerequisite tasks as comma-separated list"
    )]
    pub depends_on: Vec<u64>,
}

impl From<AddTaskArgs> for CreateTask {
    fn from(val: AddTaskArgs) -> Self {
        CreateTask {
            owner_id: val.owner,
            project_id: val.project,
            name: val.name,
            description: val.description,
            priority: val.priority.map(|p| p.to_string()),
            category: val.category,
            due_date: val.due_date,
            due_time: val.due_time,
            dependency_ids: val.depends_on,
        }
    }
}

/// Show a single task
#[derive(Args)]
pub struct ShowTaskArgs {
    #[arg(help = "Unique identifier of the task")]
    pub id: u64,
}

impl From<ShowTaskArgs> for Id {
    fn from(val: ShowTaskArgs) -> Self {
        Id { id: val.id }
    }
}

/// List tasks
#[derive(Args)]
pub struct ListTasksArgs {
    #[arg(long, help = "Only tasks of this owner")]
    pub owner: Option<u64>,
    #[arg(long, help = "Only tasks in this project")]
    pub project: Option<u64>,
    #[arg(short, long, value_enum, help = "Only tasks with this status")]
    pub status: Option<StatusArg>,
    #[arg(long, help = "Only instances generated from this template")]
    pub template: Option<u64>,
}

impl From<ListTasksArgs> for ListTasks {
    fn from(val: ListTasksArgs) -> Self {
        ListTasks {
            owner_id: val.owner,
            project_id: val.project,
            status: val.status.map(|s| s.to_string()),
            template_id: val.template,
        }
    }
}

/// Change a task's status
///
/// Moving to in-progress, review or completed requires every prerequisite,
/// direct or transitive, to be completed. Moving back to todo always works.
#[derive(Args)]
pub struct StatusArgs {
    #[arg(help = "Unique identifier of the task")]
    pub id: u64,
    #[arg(value_enum, help = "New status")]
    pub status: StatusArg,
}

impl From<StatusArgs> for UpdateStatus {
    fn from(val: StatusArgs) -> Self {
        UpdateStatus {
            id: val.id,
            status: val.status.to_string(),
        }
    }
}

/// Replace a task's prerequisites
///
/// The given IDs become the complete dependency set. Pass no IDs to remove
/// every prerequisite.
#[derive(Args)]
pub struct DepsArgs {
    #[arg(help = "Unique identifier of the task")]
    pub id: u64,
    #[arg(
        value_delimiter = ',',
        help = "IDs of prerequisite tasks (comma or space separated)"
    )]
    pub dependency_ids: Vec<u64>,
}

impl From<DepsArgs> for SetDependencies {
    fn from(val: DepsArgs) -> Self {
        SetDependencies {
            id: val.id,
            dependency_ids: val.dependency_ids,
        }
    }
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Create a new task
    #[command(alias = "a")]
    Add(AddTaskArgs),
    /// Show details of a task
    #[command(alias = "s")]
    Show(ShowTaskArgs),
    /// List tasks
    #[command(aliases = ["l", "ls"])]
    List(ListTasksArgs),
    /// Change a task's status
    #[command(alias = "st")]
    Status(StatusArgs),
    /// Replace a task's prerequisites
    #[command(alias = "d")]
    Deps(DepsArgs),
    /// Show what blocks a task
    #[command(alias = "b")]
    Blockers(ShowTaskArgs),
    /// List tasks that can become prerequisites without a cycle
    Available(ShowTaskArgs),
    /// Delete a task permanently
    #[command(alias = "rm")]
    Delete(ShowTaskArgs),
    /// Drop a generated instance; its date is never generated again
    Skip(ShowTaskArgs),
}

// ============================================================================
// Template arguments
// ============================================================================

/// Create a recurring template
///
/// Weekly and custom templates need `--weekdays`; monthly templates need
/// `--month-day`. Days past the end of a short month fall on its last day.
#[derive(Args)]
pub struct AddTemplateArgs {
    /// Name given to every generated task
    pub name: String,
    #[arg(short, long, value_enum, help = "How the template repeats")]
    pub frequency: FrequencyArg,
    #[arg(
        short,
        long,
        default_value_t = 1,
        help = "Every N days, weeks, months or matching weekdays"
    )]
    pub interval: u32,
    #[arg(
        short,
        long,
        value_delimiter = ',',
        help = "Weekdays as comma-separated list (mon,wed,fri)"
    )]
    pub weekdays: Vec<String>,
    #[arg(long, help = "Day of month for monthly templates (1-31)")]
    pub month_day: Option<u8>,
    #[arg(long, help = "First date the template applies to; defaults to today")]
    pub start_date: Option<Date>,
    #[arg(long, help = "Last date an instance may be generated for")]
    pub end_date: Option<Date>,
    #[arg(long, help = "Stop after this many instances have been generated")]
    pub max_instances: Option<u32>,
    #[arg(long, default_value_t = DEFAULT_OWNER, help = "Owner of generated tasks")]
    pub owner: u64,
    #[arg(long, help = "Project generated tasks belong to")]
    pub project: Option<u64>,
    #[arg(short, long, help = "Description copied to generated tasks")]
    pub description: Option<String>,
    #[arg(short, long, value_enum, help = "Priority of generated tasks")]
    pub priority: Option<PriorityArg>,
    #[arg(short, long, help = "Category of generated tasks")]
    pub category: Option<String>,
    #[arg(long, help = "Due time of generated tasks (HH:MM)")]
    pub due_time: Option<Time>,
    #[arg(long, help = "Create the template paused")]
    pub inactive: bool,
}

impl From<AddTemplateArgs> for CreateTemplate {
    fn from(val: AddTemplateArgs) -> Self {
        CreateTemplate {
            owner_id: val.owner,
            project_id: val.project,
            name: val.name,
            description: val.description,
            priority: val.priority.map(|p| p.to_string()),
            category: val.category,
            due_time: val.due_time,
            start_date: val.start_date.unwrap_or_else(today),
            active: !val.inactive,
            frequency: val.frequency.to_string(),
            interval: val.interval,
            weekdays: val.weekdays,
            month_day: val.month_day,
            max_instances: val.max_instances,
            end_date: val.end_date,
        }
    }
}

/// Update a recurring template
///
/// Only the given fields change. The merged template is validated before it
/// is saved.
#[derive(Args)]
pub struct UpdateTemplateArgs {
    #[arg(help = "Unique identifier of the template")]
    pub id: u64,
    #[arg(short, long, help = "New name")]
    pub name: Option<String>,
    #[arg(short, long, value_enum, help = "New frequency")]
    pub frequency: Option<FrequencyArg>,
    #[arg(short, long, help = "New interval")]
    pub interval: Option<u32>,
    #[arg(
        short,
        long,
        value_delimiter = ',',
        help = "New weekdays as comma-separated list"
    )]
    pub weekdays: Option<Vec<String>>,
    #[arg(long, help = "New day of month")]
    pub month_day: Option<u8>,
    #[arg(long, help = "New start date")]
    pub start_date: Option<Date>,
    #[arg(long, conflicts_with = "clear_end_date", help = "New end date")]
    pub end_date: Option<Date>,
    #[arg(long, help = "Remove the end date")]
    pub clear_end_date: bool,
    #[arg(
        long,
        conflicts_with = "clear_max_instances",
        help = "New instance limit"
    )]
    pub max_instances: Option<u32>,
    #[arg(long, help = "Remove the instance limit")]
    pub clear_max_instances: bool,
    #[arg(short, long, help = "New description")]
    pub description: Option<String>,
    #[arg(short, long, value_enum, help = "New priority")]
    pub priority: Option<PriorityArg>,
    #[arg(short, long, help = "New category")]
    pub category: Option<String>,
    #[arg(long, help = "New due time (HH:MM)")]
    pub due_time: Option<Time>,
    #[arg(long, conflicts_with = "pause", help = "Resume generation")]
    pub resume: bool,
    #[arg(long, help = "Stop generation without deleting the template")]
    pub pause: bool,
}

impl From<UpdateTemplateArgs> for UpdateTemplate {
    fn from(val: UpdateTemplateArgs) -> Self {
        let active = match (val.resume, val.pause) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        UpdateTemplate {
            id: val.id,
            name: val.name,
            description: val.description,
            priority: val.priority.map(|p| p.to_string()),
            category: val.category,
            due_time: val.due_time,
            start_date: val.start_date,
            active,
            frequency: val.frequency.map(|f| f.to_string()),
            interval: val.interval,
            weekdays: val.weekdays,
            month_day: val.month_day,
            max_instances: val.max_instances,
            end_date: val.end_date,
            clear_end_date: val.clear_end_date,
            clear_max_instances: val.clear_max_instances,
        }
    }
}

/// Show a template and its upcoming dates
#[derive(Args)]
pub struct ShowTemplateArgs {
    #[arg(help = "Unique identifier of the template")]
    pub id: u64,
    #[arg(
        short,
        long,
        default_value_t = 5,
        help = "Number of upcoming due dates to list"
    )]
    pub next: usize,
}

/// List recurring templates
#[derive(Args)]
pub struct ListTemplatesArgs {
    #[arg(long, help = "Only templates of this owner")]
    pub owner: Option<u64>,
    #[arg(long, help = "Hide paused templates")]
    pub active: bool,
}

impl From<ListTemplatesArgs> for ListTemplates {
    fn from(val: ListTemplatesArgs) -> Self {
        ListTemplates {
            owner_id: val.owner,
            active_only: val.active,
        }
    }
}

/// Delete a template. Tasks it already generated are kept.
#[derive(Args)]
pub struct DeleteTemplateArgs {
    #[arg(help = "Unique identifier of the template")]
    pub id: u64,
}

impl From<DeleteTemplateArgs> for Id {
    fn from(val: DeleteTemplateArgs) -> Self {
        Id { id: val.id }
    }
}

/// List the tasks a template has generated
#[derive(Args)]
pub struct TemplateInstancesArgs {
    #[arg(help = "Unique identifier of the template")]
    pub id: u64,
}

impl From<TemplateInstancesArgs> for Id {
    fn from(val: TemplateInstancesArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// Create a recurring template
    #[command(alias = "a")]
    Add(AddTemplateArgs),
    /// Update a recurring template
    #[command(alias = "u")]
    Update(UpdateTemplateArgs),
    /// Show a template and its next due dates
    #[command(alias = "s")]
    Show(ShowTemplateArgs),
    /// List recurring templates
    #[command(aliases = ["l", "ls"])]
    List(ListTemplatesArgs),
    /// Delete a recurring template
    #[command(alias = "rm")]
    Delete(DeleteTemplateArgs),
    /// List tasks generated from a template
    #[command(alias = "i")]
    Instances(TemplateInstancesArgs),
}

// ============================================================================
// Scheduler arguments
// ============================================================================

/// Run one generation pass
#[derive(Args)]
pub struct GenerateArgs {
    #[arg(long, help = "Date to generate for; defaults to today")]
    pub date: Option<Date>,
    #[arg(
        long,
        default_value_t = 7,
        help = "Days before the date that missed instances are filled in for"
    )]
    pub catch_up_days: u32,
}

impl From<&GenerateArgs> for GeneratePass {
    fn from(val: &GenerateArgs) -> Self {
        GeneratePass { date: val.date }
    }
}

/// Run the scheduler loop until interrupted
#[derive(Args)]
pub struct ServeArgs {
    #[arg(
        long,
        default_value_t = 3600,
        help = "Seconds between generation passes"
    )]
    pub interval_secs: u64,
    #[arg(
        long,
        default_value_t = 7,
        help = "Days before today that missed instances are filled in for"
    )]
    pub catch_up_days: u32,
    #[arg(long, help = "Wait one interval before the first pass")]
    pub no_initial_run: bool,
}

impl From<&ServeArgs> for SchedulerConfig {
    fn from(val: &ServeArgs) -> Self {
        SchedulerConfig {
            interval: Duration::from_secs(val.interval_secs),
            catch_up_days: val.catch_up_days,
            run_on_start: !val.no_initial_run,
        }
    }
}

// ============================================================================
// Value enums
// ============================================================================

/// Command-line representation of task statuses
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum StatusArg {
    Todo,
    InProgress,
    Review,
    Completed,
}

impl std::fmt::Display for StatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusArg::Todo => write!(f, "todo"),
            StatusArg::InProgress => write!(f, "in_progress"),
            StatusArg::Review => write!(f, "review"),
            StatusArg::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for PriorityArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriorityArg::Low => write!(f, "low"),
            PriorityArg::Medium => write!(f, "medium"),
            PriorityArg::High => write!(f, "high"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum FrequencyArg {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl std::fmt::Display for FrequencyArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrequencyArg::Daily => write!(f, "daily"),
            FrequencyArg::Weekly => write!(f, "weekly"),
            FrequencyArg::Monthly => write!(f, "monthly"),
            FrequencyArg::Custom => write!(f, "custom"),
        }
    }
}

fn today() -> Date {
    Zoned::now().date()
}

// ============================================================================
// Handlers
// ============================================================================

/// Runs parsed commands against a tracker and renders the results.
pub struct Cli {
    tracker: Tracker,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(tracker: Tracker, renderer: TerminalRenderer) -> Self {
        Self { tracker, renderer }
    }

    pub async fn handle_task_command(&self, command: TaskCommands) -> Result<()> {
        match command {
            TaskCommands::Add(args) => {
                let task = self.tracker.create_task(&args.into()).await?;
                self.renderer.render(&CreateResult::new(task).to_string())
            }
            TaskCommands::Show(args) => {
                let id: Id = args.into();
                let task = self
                    .tracker
                    .get_task(&id)
                    .await?
                    .with_context(|| format!("Task with ID {} not found", id.id))?;
                self.renderer.render(&task.to_string())
            }
            TaskCommands::List(args) => self.list_tasks(&args.into()).await,
            TaskCommands::Status(args) => {
                let task = self.tracker.update_status(&args.into()).await?;
                let status = OperationStatus::success(format!(
                    "Task {} is now {}",
                    task.id,
                    task.status.with_icon()
                ));
                self.renderer.render(&status.to_string())
            }
            TaskCommands::Deps(args) => {
                let task = self.tracker.set_dependencies(&args.into()).await?;
                self.renderer.render(&UpdateResult::new(task).to_string())
            }
            TaskCommands::Blockers(args) => {
                let status = self.tracker.dependency_status(&args.into()).await?;
                self.renderer.render(&status.to_string())
            }
            TaskCommands::Available(args) => {
                let candidates = self.tracker.available_dependencies(&args.into()).await?;
                self.renderer.render(&candidates.to_string())
            }
            TaskCommands::Delete(args) => {
                let task = self.tracker.delete_task(&args.into()).await?;
                self.renderer.render(&DeleteResult::new(task).to_string())
            }
            TaskCommands::Skip(args) => {
                let task = self.tracker.skip_instance(&args.into()).await?;
                let date = task
                    .generation_date
                    .map_or_else(String::new, |date| format!(" for {date}"));
                let status = OperationStatus::success(format!(
                    "Skipped '{}' (ID: {}){date}; it will not be generated again",
                    task.name, task.id
                ));
                self.renderer.render(&status.to_string())
            }
        }
    }

    pub async fn handle_template_command(&self, command: TemplateCommands) -> Result<()> {
        match command {
            TemplateCommands::Add(args) => {
                let template = self.tracker.create_template(&args.into()).await?;
                self.renderer.render(&CreateResult::new(template).to_string())
            }
            TemplateCommands::Update(args) => {
                let result = self.tracker.update_template(&args.into()).await?;
                self.renderer.render(&result.to_string())
            }
            TemplateCommands::Show(args) => {
                let template = self
                    .tracker
                    .get_template(&Id { id: args.id })
                    .await?
                    .with_context(|| {
                        format!("Recurring template with ID {} not found", args.id)
                    })?;

                let mut output = template.to_string();
                let upcoming = next_occurrences(&template, today(), args.next);
                if !upcoming.is_empty() {
                    output.push_str("\n## Next due dates\n\n");
                    for date in upcoming {
                        output.push_str(&format!("- {date}\n"));
                    }
                }
                self.renderer.render(&output)
            }
            TemplateCommands::List(args) => {
                let templates = self.tracker.list_templates(&args.into()).await?;
                self.renderer.render(&templates.to_string())
            }
            TemplateCommands::Delete(args) => {
                let template = self.tracker.delete_template(&args.into()).await?;
                self.renderer.render(&DeleteResult::new(template).to_string())
            }
            TemplateCommands::Instances(args) => {
                let tasks = self.tracker.template_instances(&args.into()).await?;
                self.renderer.render(&tasks.to_string())
            }
        }
    }

    pub async fn generate(&self, args: &GenerateArgs) -> Result<()> {
        let config = SchedulerConfig {
            catch_up_days: args.catch_up_days,
            ..SchedulerConfig::default()
        };
        let scheduler = Scheduler::new(self.tracker.clone(), config);
        let summary = scheduler
            .generate(&args.into())
            .await
            .context("Generation pass failed")?;
        self.renderer.render(&summary.to_string())
    }

    /// Runs the scheduler loop until Ctrl-C, logging every generated task.
    pub async fn serve(&self, args: &ServeArgs) -> Result<()> {
        let scheduler = Scheduler::new(self.tracker.clone(), args.into());
        let events = scheduler.subscribe();
        let handle = scheduler.start();

        let listener = tokio::spawn(log_task_due_events(events));

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
        info!("Shutting down scheduler");

        handle.stop().await.context("Scheduler did not stop cleanly")?;
        listener.abort();
        Ok(())
    }

    pub async fn list_tasks(&self, params: &ListTasks) -> Result<()> {
        let tasks = self.tracker.list_tasks(params).await?;
        self.renderer.render(&tasks.to_string())
    }
}

/// Logs task-due events until the scheduler drops its sender. A slow
/// listener that falls behind skips the missed events and keeps going.
/// Returns the number of events logged.
async fn log_task_due_events(mut events: broadcast::Receiver<TaskDue>) -> usize {
    let mut logged = 0;
    loop {
        match events.recv().await {
            Ok(due) => {
                info!("Task due: {due}");
                logged += 1;
            }
            Err(RecvError::Lagged(missed)) => warn!("Missed {missed} task-due events"),
            Err(RecvError::Closed) => break,
        }
    }
    logged
}
