//! Graph store interface used by the dependency validator and the generator.
//!
//! The engine reads and writes tasks, edges, templates and receipts only
//! through [`GraphStore`], so validation and generation logic can run against
//! any backend. [`Database`] is the SQLite implementation.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::{
    db::Database,
    error::Result,
    models::{GenerationReceipt, NewTask, RecurringTemplate, Task, TaskStatus},
};

/// Result of resolving a list of task ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskLookup {
    /// Tasks that exist, in request order
    pub found: Vec<Task>,
    /// Requested ids with no task behind them
    pub missing: Vec<u64>,
}

/// Minimal view of a task used for graph traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: u64,
    pub project_id: Option<u64>,
    pub name: String,
    pub status: TaskStatus,
    pub dependency_ids: Vec<u64>,
}

impl From<&Task> for GraphNode {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            project_id: task.project_id,
            name: task.name.clone(),
            status: task.status,
            dependency_ids: task.dependency_ids.clone(),
        }
    }
}

/// Persistence operations the engine depends on.
pub trait GraphStore {
    fn get_task(&self, id: u64) -> Result<Option<Task>>;

    /// Resolves ids without failing on missing ones.
    fn list_tasks_by_ids(&self, ids: &[u64]) -> Result<TaskLookup>;

    /// All tasks of one owner with their edges.
    fn owner_graph(&self, owner_id: u64) -> Result<Vec<GraphNode>>;

    fn update_task_status(&mut self, id: u64, status: TaskStatus) -> Result<Task>;

    /// Replaces the edge set of `id` atomically.
    fn update_task_dependencies(&mut self, id: u64, dependency_ids: &[u64]) -> Result<Task>;

    fn create_task(&mut self, task: &NewTask) -> Result<Task>;

    fn list_active_templates(&self) -> Result<Vec<RecurringTemplate>>;

    fn receipt_for(&self, template_id: u64, date: Date) -> Result<Option<GenerationReceipt>>;

    fn has_receipt(&self, template_id: u64, date: Date) -> Result<bool> {
        Ok(self.receipt_for(template_id, date)?.is_some())
    }

    fn latest_receipt_date(&self, template_id: u64) -> Result<Option<Date>>;

    /// Instances ever generated for a template, counted by receipts.
    fn receipt_count(&self, template_id: u64) -> Result<u64>;

    /// Writes a generated task and its receipt together, failing with
    /// [`crate::TrackerError::DuplicateGeneration`] if the receipt exists and
    /// with [`crate::TrackerError::InstanceLimitReached`] once the template's
    /// `max_instances` receipts exist.
    fn create_instance(&mut self, task: &NewTask) -> Result<(Task, GenerationReceipt)>;
}

impl GraphStore for Database {
    fn get_task(&self, id: u64) -> Result<Option<Task>> {
        Database::get_task(self, id)
    }

    fn list_tasks_by_ids(&self, ids: &[u64]) -> Result<TaskLookup> {
        Database::list_tasks_by_ids(self, ids)
    }

    fn owner_graph(&self, owner_id: u64) -> Result<Vec<GraphNode>> {
        Database::owner_graph(self, owner_id)
    }

    fn update_task_status(&mut self, id: u64, status: TaskStatus) -> Result<Task> {
        Database::update_task_status(self, id, status)
    }

    fn update_task_dependencies(&mut self, id: u64, dependency_ids: &[u64]) -> Result<Task> {
        Database::update_task_dependencies(self, id, dependency_ids)
    }

    fn create_task(&mut self, task: &NewTask) -> Result<Task> {
        Database::create_task(self, task)
    }

    fn list_active_templates(&self) -> Result<Vec<RecurringTemplate>> {
        Database::list_active_templates(self)
    }

    fn receipt_for(&self, template_id: u64, date: Date) -> Result<Option<GenerationReceipt>> {
        Database::receipt_for(self, template_id, date)
    }

    fn latest_receipt_date(&self, template_id: u64) -> Result<Option<Date>> {
        Database::latest_receipt_date(self, template_id)
    }

    fn receipt_count(&self, template_id: u64) -> Result<u64> {
        Database::receipt_count(self, template_id)
    }

    fn create_instance(&mut self, task: &NewTask) -> Result<(Task, GenerationReceipt)> {
        Database::create_instance(self, task)
    }
}
