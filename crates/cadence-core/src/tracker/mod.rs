//! High-level async API for tasks, dependencies and recurring templates.
//!
//! [`Tracker`] is the entry point for request-facing layers. Each operation
//! opens its own connection on the blocking thread pool, so a `Tracker` is
//! cheap to clone and share between request handlers and the
//! [`Scheduler`](crate::scheduler::Scheduler).
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │    Tracker      │    │  graph, gen,    │    │    Database     │
//! │ (task_ops,      │───▶│  recurrence     │───▶│   (via store)   │
//! │  template_ops)  │    │                 │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!    Async facade          Engine logic          Data persistence
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_core::{params::{CreateTask, UpdateStatus}, TrackerBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tracker = TrackerBuilder::new().build().await?;
//!
//! let design = tracker
//!     .create_task(&CreateTask {
//!         owner_id: 1,
//!         name: "Design".to_string(),
//!         ..CreateTask::default()
//!     })
//!     .await?;
//! let build = tracker
//!     .create_task(&CreateTask {
//!         owner_id: 1,
//!         name: "Build".to_string(),
//!         dependency_ids: vec![design.id],
//!         ..CreateTask::default()
//!     })
//!     .await?;
//!
//! // Rejected until "Design" is completed
//! let blocked = tracker
//!     .update_status(&UpdateStatus { id: build.id, status: "in_progress".to_string() })
//!     .await;
//! assert!(blocked.is_err());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tokio::task;

use crate::{
    db::Database,
    error::{Result, TrackerError},
    graph::GraphLimits,
};

pub mod builder;
pub mod task_ops;
pub mod template_ops;

#[cfg(test)]
mod tests;

pub use builder::TrackerBuilder;

/// Main interface for managing tasks and templates.
#[derive(Debug, Clone)]
pub struct Tracker {
    pub(crate) db_path: PathBuf,
    pub(crate) limits: GraphLimits,
}

impl Tracker {
    pub(crate) fn new(db_path: PathBuf, limits: GraphLimits) -> Self {
        Self { db_path, limits }
    }

    /// Path of the SQLite database backing this tracker.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    pub fn limits(&self) -> GraphLimits {
        self.limits
    }

    /// Runs `operation` against a fresh connection on the blocking pool.
    pub(crate) async fn with_database<T, F>(&self, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            operation(&mut db)
        })
        .await
        .map_err(TrackerError::join)?
    }
}
