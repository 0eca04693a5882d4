//! Derived views: dependency status and scheduler pass summaries.

use jiff::civil::{Date, Time};
use serde::{Deserialize, Serialize};

use super::TaskStatus;

/// A prerequisite that keeps a task from starting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockingTask {
    pub id: u64,
    /// `None` when the referenced task no longer exists
    pub name: Option<String>,
    pub status: Option<TaskStatus>,
}

impl BlockingTask {
    pub(crate) fn missing(id: u64) -> Self {
        Self {
            id,
            name: None,
            status: None,
        }
    }

    /// Human-readable name, or a placeholder for a dangling reference.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("missing task #{}", self.id),
        }
    }
}

/// Answer to "may this task start, and if not, what is in the way?"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyStatus {
    pub task_id: u64,
    pub can_start: bool,
    /// Direct dependencies that are not completed, in dependency order
    pub blocking_tasks: Vec<BlockingTask>,
    /// Every incomplete upstream task, deepest prerequisite first
    pub outstanding_prerequisites: Vec<BlockingTask>,
}

/// Event published for each instance materialized by a scheduler pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDue {
    pub task_id: u64,
    pub template_id: u64,
    pub owner_id: u64,
    pub name: String,
    pub due_date: Date,
    pub due_time: Option<Time>,
}

/// A template that failed during a pass. Other templates are unaffected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateFailure {
    pub template_id: u64,
    pub template_name: String,
    pub message: String,
}

/// Outcome of one scheduler pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassSummary {
    pub as_of: Date,
    /// Active templates fetched at the start of the pass
    pub templates_seen: usize,
    /// Templates that produced at least one new instance
    pub generated: usize,
    /// Templates with nothing new to create
    pub skipped: usize,
    /// Templates that failed
    pub errored: usize,
    /// Instances created by this pass
    pub instances: Vec<TaskDue>,
    pub errors: Vec<TemplateFailure>,
    /// Set when shutdown interrupted the pass; remaining templates were not
    /// visited and will be picked up by the next pass
    pub cancelled: bool,
}

impl PassSummary {
    pub fn new(as_of: Date) -> Self {
        Self {
            as_of,
            templates_seen: 0,
            generated: 0,
            skipped: 0,
            errored: 0,
            instances: Vec::new(),
            errors: Vec::new(),
            cancelled: false,
        }
    }
}
