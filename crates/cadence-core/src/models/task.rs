//! Task model definition.

use jiff::{
    civil::{Date, Time},
    Timestamp,
};
use serde::{Deserialize, Serialize};

use super::{Priority, TaskStatus};

/// A unit of work owned by a single user, optionally scoped to a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier for the task
    pub id: u64,

    /// Owning user; dependency edges never cross owners
    pub owner_id: u64,

    /// Project the task belongs to, if any
    pub project_id: Option<u64>,

    /// Short name shown in blocking lists
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    pub category: Option<String>,

    pub status: TaskStatus,

    pub due_date: Option<Date>,

    pub due_time: Option<Time>,

    /// Tasks that must be completed before this one may leave Todo, in the
    /// order they were given
    #[serde(default)]
    pub dependency_ids: Vec<u64>,

    /// Template this task was generated from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_template_id: Option<u64>,

    /// Calendar date the instance was generated for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_date: Option<Date>,

    /// Timestamp when the task was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the task was last updated (UTC)
    pub updated_at: Timestamp,
}

impl Task {
    /// Whether the task was materialized by the generation engine.
    pub fn is_generated(&self) -> bool {
        self.recurring_template_id.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Fields for inserting a task. Generated instances carry `origin`.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub owner_id: u64,
    pub project_id: Option<u64>,
    pub name: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub category: Option<String>,
    pub due_date: Option<Date>,
    pub due_time: Option<Time>,
    pub dependency_ids: Vec<u64>,
    pub origin: Option<GenerationOrigin>,
}

/// The (template, date) pair a generated task came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationOrigin {
    pub template_id: u64,
    pub date: Date,
}
