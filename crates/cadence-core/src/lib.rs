//! Core library for the Cadence task engine.
//!
//! Cadence keeps a per-owner dependency graph of tasks and materializes
//! recurring tasks from templates:
//!
//! - [`graph`]: cycle-free dependency edits and status gating
//! - [`recurrence`]: pure "is this template due on this date" evaluation
//! - [`generator`]: exactly-once instance creation guarded by receipts
//! - [`scheduler`]: timer-driven and on-demand generation passes
//! - [`store`]: the persistence interface, implemented by [`Database`]
//! - [`tracker`]: the async facade request handlers call
//!
//! Models implement [`std::fmt::Display`] as markdown, and [`display`]
//! provides wrappers for collections and operation results.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cadence_core::{
//!     params::{CreateTemplate, ListTasks},
//!     scheduler::{Scheduler, SchedulerConfig},
//!     TrackerBuilder,
//! };
//! use jiff::civil::date;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tracker = TrackerBuilder::new()
//!     .with_database_path("cadence.db")
//!     .build()
//!     .await?;
//!
//! tracker
//!     .create_template(&CreateTemplate {
//!         owner_id: 1,
//!         project_id: None,
//!         name: "Standup notes".to_string(),
//!         description: None,
//!         priority: None,
//!         category: None,
//!         due_time: None,
//!         start_date: date(2026, 1, 5),
//!         active: true,
//!         frequency: "weekly".to_string(),
//!         interval: 1,
//!         weekdays: vec!["mon".to_string(), "thu".to_string()],
//!         month_day: None,
//!         max_instances: None,
//!         end_date: None,
//!     })
//!     .await?;
//!
//! let scheduler = Scheduler::new(tracker.clone(), SchedulerConfig::default());
//! let summary = scheduler.run_pass(date(2026, 1, 8)).await?;
//! println!("{summary}");
//!
//! let tasks = tracker.list_tasks(&ListTasks::default()).await?;
//! println!("{tasks}");
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod display;
pub mod error;
pub mod generator;
pub mod graph;
pub mod models;
pub mod params;
pub mod recurrence;
pub mod scheduler;
pub mod store;
pub mod tracker;

// Re-export commonly used types
pub use db::Database;
pub use display::{
    Candidates, CreateResult, DeleteResult, LocalDateTime, OperationStatus, Tasks, Templates,
    UpdateResult,
};
pub use error::{Result, TrackerError};
pub use graph::GraphLimits;
pub use models::{
    BlockingTask, DependencyStatus, Frequency, GenerationReceipt, PassSummary, Priority,
    RecurrencePattern, RecurringTemplate, Task, TaskDue, TaskStatus, Weekdays,
};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerHandle};
pub use store::GraphStore;
pub use tracker::{Tracker, TrackerBuilder};
