//! Task and dependency operations for the Tracker.

use log::info;

use super::Tracker;
use crate::{
    display::{Candidates, Tasks},
    error::{Result, TrackerError},
    graph::validator,
    models::{BlockingTask, DependencyStatus, NewTask, Task, TaskFilter},
    params::{CreateTask, Id, ListTasks, SetDependencies, UpdateStatus},
};

impl Tracker {
    /// Creates a task in the Todo state. Initial dependencies must exist and
    /// belong to the same owner.
    pub async fn create_task(&self, params: &CreateTask) -> Result<Task> {
        let task = NewTask::try_from(params.clone())?;

        self.with_database(move |db| validator::create_task(db, task))
            .await
    }

    /// Retrieves a task by its ID.
    pub async fn get_task(&self, params: &Id) -> Result<Option<Task>> {
        let task_id = params.id;
        self.with_database(move |db| db.get_task(task_id)).await
    }

    /// Lists tasks filtered by owner, project, status and source template.
    pub async fn list_tasks(&self, params: &ListTasks) -> Result<Tasks> {
        let filter = TaskFilter::try_from(params.clone())?;
        let tasks = self
            .with_database(move |db| db.list_tasks(&filter))
            .await?;
        Ok(Tasks(tasks))
    }

    /// Changes a task's status, enforcing the dependency gate.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::DependencyNotMet` with the names of every
    /// incomplete prerequisite when moving to a gated status.
    pub async fn update_status(&self, params: &UpdateStatus) -> Result<Task> {
        let status = params.validate()?;
        let task_id = params.id;
        let limits = self.limits;

        self.with_database(move |db| validator::update_status(db, task_id, status, limits))
            .await
    }

    /// Replaces a task's dependency set after self, ownership and cycle
    /// checks. Nothing is written when a check fails.
    pub async fn set_dependencies(&self, params: &SetDependencies) -> Result<Task> {
        let task_id = params.id;
        let dependency_ids = params.dependency_ids.clone();
        let limits = self.limits;

        self.with_database(move |db| {
            validator::set_dependencies(db, task_id, &dependency_ids, limits)
        })
        .await
    }

    /// Whether the task may leave Todo right now.
    pub async fn can_start(&self, params: &Id) -> Result<bool> {
        let task_id = params.id;
        self.with_database(move |db| {
            let task = db
                .get_task(task_id)?
                .ok_or(TrackerError::TaskNotFound { id: task_id })?;
            validator::can_start(&*db, &task)
        })
        .await
    }

    /// Direct dependencies that are not completed yet.
    pub async fn blocking_tasks(&self, params: &Id) -> Result<Vec<BlockingTask>> {
        let task_id = params.id;
        self.with_database(move |db| {
            let task = db
                .get_task(task_id)?
                .ok_or(TrackerError::TaskNotFound { id: task_id })?;
            validator::blocking_tasks(&*db, &task)
        })
        .await
    }

    /// `can_start` together with direct and transitive blockers.
    pub async fn dependency_status(&self, params: &Id) -> Result<DependencyStatus> {
        let task_id = params.id;
        let limits = self.limits;
        self.with_database(move |db| validator::dependency_status(&*db, task_id, limits))
            .await
    }

    /// Tasks that can be added as dependencies without closing a cycle.
    pub async fn available_dependencies(&self, params: &Id) -> Result<Candidates> {
        let task_id = params.id;
        let limits = self.limits;
        let nodes = self
            .with_database(move |db| validator::available_dependencies(&*db, task_id, limits))
            .await?;
        Ok(Candidates(nodes))
    }

    /// Deletes a task, pruning it from its dependents. Returns the deleted
    /// task.
    pub async fn delete_task(&self, params: &Id) -> Result<Task> {
        let task_id = params.id;
        self.with_database(move |db| db.delete_task(task_id)).await
    }

    /// Drops one generated instance. Its receipt stays, so the scheduler
    /// never creates that date again.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::TaskNotFound` for an unknown id and
    /// `TrackerError::InvalidInput` for a task that was not generated from a
    /// template.
    pub async fn skip_instance(&self, params: &Id) -> Result<Task> {
        let task_id = params.id;
        let skipped = self
            .with_database(move |db| {
                let task = db
                    .get_task(task_id)?
                    .ok_or(TrackerError::TaskNotFound { id: task_id })?;
                if task.recurring_template_id.is_none() {
                    return Err(TrackerError::invalid_input("id").with_reason(format!(
                        "task {task_id} was not generated from a template"
                    )));
                }
                db.delete_task(task_id)
            })
            .await?;

        if let (Some(template_id), Some(date)) =
            (skipped.recurring_template_id, skipped.generation_date)
        {
            info!("Skipped instance {task_id} of template {template_id} for {date}");
        }
        Ok(skipped)
    }
}
