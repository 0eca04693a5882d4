//! Task CRUD operations, dependency edges and graph queries.

use std::collections::HashMap;

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::utils::{id_column, optional_id_column, parse_column, parse_optional_column};
use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    models::{NewTask, Task, TaskFilter, TaskStatus},
    store::{GraphNode, TaskLookup},
};

const TASK_COLUMNS: &str = "id, owner_id, project_id, name, description, priority, category, \
     status, due_date, due_time, recurring_template_id, generation_date, created_at, updated_at";
const INSERT_TASK_SQL: &str = "INSERT INTO tasks (owner_id, project_id, name, description, priority, category, status, due_date, due_time, recurring_template_id, generation_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";
const INSERT_DEPENDENCY_SQL: &str =
    "INSERT INTO task_dependencies (task_id, depends_on_id, position) VALUES (?1, ?2, ?3)";
const DELETE_DEPENDENCIES_SQL: &str = "DELETE FROM task_dependencies WHERE task_id = ?1";
const SELECT_DEPENDENCIES_SQL: &str =
    "SELECT depends_on_id FROM task_dependencies WHERE task_id = ?1 ORDER BY position";
const CHECK_TASK_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1)";
const UPDATE_STATUS_SQL: &str = "UPDATE tasks SET status = ?1, updated_at = ?2 WHERE id = ?3";
const TOUCH_TASK_SQL: &str = "UPDATE tasks SET updated_at = ?1 WHERE id = ?2";
const DELETE_TASK_SQL: &str = "DELETE FROM tasks WHERE id = ?1";
const SELECT_OWNER_NODES_SQL: &str =
    "SELECT id, project_id, name, status FROM tasks WHERE owner_id = ?1 ORDER BY id";
const SELECT_OWNER_EDGES_SQL: &str = "SELECT d.task_id, d.depends_on_id FROM task_dependencies d \
     JOIN tasks t ON t.id = d.task_id WHERE t.owner_id = ?1 ORDER BY d.task_id, d.position";

impl super::Database {
    /// Helper function to construct a Task (without its edges) from a row
    /// selected with [`TASK_COLUMNS`].
    fn build_task_from_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        Ok(Task {
            id: id_column(row, 0)?,
            owner_id: id_column(row, 1)?,
            project_id: optional_id_column(row, 2)?,
            name: row.get(3)?,
            description: row.get(4)?,
            priority: parse_column(row, 5)?,
            category: row.get(6)?,
            status: parse_column(row, 7)?,
            due_date: parse_optional_column(row, 8)?,
            due_time: parse_optional_column(row, 9)?,
            dependency_ids: Vec::new(),
            recurring_template_id: optional_id_column(row, 10)?,
            generation_date: parse_optional_column(row, 11)?,
            created_at: parse_column(row, 12)?,
            updated_at: parse_column(row, 13)?,
        })
    }

    fn load_dependencies(connection: &Connection, task_id: u64) -> Result<Vec<u64>> {
        let mut stmt = connection
            .prepare_cached(SELECT_DEPENDENCIES_SQL)
            .db_context("Failed to prepare dependency query")?;
        let ids = stmt
            .query_map(params![task_id as i64], |row| id_column(row, 0))
            .db_context("Failed to query dependencies")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch dependencies")?;
        Ok(ids)
    }

    pub(super) fn fetch_task(connection: &Connection, task_id: u64) -> Result<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        let task = connection
            .query_row(&sql, params![task_id as i64], Self::build_task_from_row)
            .optional()
            .db_context("Failed to get task")?;

        match task {
            Some(mut task) => {
                task.dependency_ids = Self::load_dependencies(connection, task.id)?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// Inserts the task row and its ordered edges; the caller owns the
    /// transaction.
    pub(super) fn insert_task_row(
        connection: &Connection,
        task: &NewTask,
        now: &str,
    ) -> Result<u64> {
        connection
            .execute(
                INSERT_TASK_SQL,
                params![
                    task.owner_id as i64,
                    task.project_id.map(|id| id as i64),
                    &task.name,
                    &task.description,
                    task.priority.as_str(),
                    &task.category,
                    TaskStatus::Todo.as_str(),
                    task.due_date.map(|d| d.to_string()),
                    task.due_time.map(|t| t.to_string()),
                    task.origin.map(|o| o.template_id as i64),
                    task.origin.map(|o| o.date.to_string()),
                    now,
                    now
                ],
            )
            .db_context("Failed to insert task")?;
        let id = connection.last_insert_rowid() as u64;

        for (position, dependency_id) in task.dependency_ids.iter().enumerate() {
            connection
                .execute(
                    INSERT_DEPENDENCY_SQL,
                    params![id as i64, *dependency_id as i64, position as i64],
                )
                .db_context("Failed to insert dependency")?;
        }

        Ok(id)
    }

    /// Creates a task in the Todo state together with its initial edges.
    pub fn create_task(&mut self, task: &NewTask) -> Result<Task> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        let id = Self::insert_task_row(&tx, task, &now)?;
        let created = Self::fetch_task(&tx, id)?.ok_or(TrackerError::TaskNotFound { id })?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(created)
    }

    /// Retrieves a single task, with its dependency ids, by ID.
    pub fn get_task(&self, task_id: u64) -> Result<Option<Task>> {
        Self::fetch_task(&self.connection, task_id)
    }

    /// Resolves `ids` in order; ids without a task are reported in
    /// `missing` rather than dropped.
    pub fn list_tasks_by_ids(&self, ids: &[u64]) -> Result<TaskLookup> {
        let mut lookup = TaskLookup::default();
        for &id in ids {
            match self.get_task(id)? {
                Some(task) => lookup.found.push(task),
                None => lookup.missing.push(id),
            }
        }
        Ok(lookup)
    }

    /// Lists tasks matching every set field of `filter`, oldest first.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE (?1 IS NULL OR owner_id = ?1) \
               AND (?2 IS NULL OR project_id = ?2) \
               AND (?3 IS NULL OR status = ?3) \
               AND (?4 IS NULL OR recurring_template_id = ?4) \
             ORDER BY id"
        );
        let mut stmt = self
            .connection
            .prepare(&sql)
            .db_context("Failed to prepare query")?;

        let mut tasks = stmt
            .query_map(
                params![
                    filter.owner_id.map(|id| id as i64),
                    filter.project_id.map(|id| id as i64),
                    filter.status.map(|s| s.as_str()),
                    filter.template_id.map(|id| id as i64)
                ],
                Self::build_task_from_row,
            )
            .db_context("Failed to query tasks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch tasks")?;

        for task in &mut tasks {
            task.dependency_ids = Self::load_dependencies(&self.connection, task.id)?;
        }

        Ok(tasks)
    }

    /// Loads every task of `owner_id` as a graph node with its outgoing edges.
    pub fn owner_graph(&self, owner_id: u64) -> Result<Vec<GraphNode>> {
        let mut nodes = {
            let mut stmt = self
                .connection
                .prepare(SELECT_OWNER_NODES_SQL)
                .db_context("Failed to prepare graph query")?;
            let nodes = stmt
                .query_map(params![owner_id as i64], |row| {
                    Ok(GraphNode {
                        id: id_column(row, 0)?,
                        project_id: optional_id_column(row, 1)?,
                        name: row.get(2)?,
                        status: parse_column(row, 3)?,
                        dependency_ids: Vec::new(),
                    })
                })
                .db_context("Failed to query graph nodes")?
                .collect::<std::result::Result<Vec<_>, _>>()
                .db_context("Failed to fetch graph nodes")?;
            nodes
        };

        let mut edges: HashMap<u64, Vec<u64>> = HashMap::new();
        {
            let mut stmt = self
                .connection
                .prepare(SELECT_OWNER_EDGES_SQL)
                .db_context("Failed to prepare edge query")?;
            let rows = stmt
                .query_map(params![owner_id as i64], |row| {
                    Ok((id_column(row, 0)?, id_column(row, 1)?))
                })
                .db_context("Failed to query graph edges")?;
            for row in rows {
                let (from, to) = row.db_context("Failed to fetch graph edge")?;
                edges.entry(from).or_default().push(to);
            }
        }

        for node in &mut nodes {
            if let Some(dependency_ids) = edges.remove(&node.id) {
                node.dependency_ids = dependency_ids;
            }
        }

        Ok(nodes)
    }

    /// Persists a new status. Gating happens in the dependency validator.
    pub fn update_task_status(&mut self, task_id: u64, status: TaskStatus) -> Result<Task> {
        let now_str = Timestamp::now().to_string();
        let updated = self
            .connection
            .execute(
                UPDATE_STATUS_SQL,
                params![status.as_str(), &now_str, task_id as i64],
            )
            .db_context("Failed to update task status")?;

        if updated == 0 {
            return Err(TrackerError::TaskNotFound { id: task_id });
        }

        self.get_task(task_id)?
            .ok_or(TrackerError::TaskNotFound { id: task_id })
    }

    /// Replaces the task's edge set in one transaction. Old edges are
    /// discarded, not merged.
    pub fn update_task_dependencies(
        &mut self,
        task_id: u64,
        dependency_ids: &[u64],
    ) -> Result<Task> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let exists: bool = tx
            .query_row(CHECK_TASK_EXISTS_SQL, params![task_id as i64], |row| {
                row.get(0)
            })
            .db_context("Failed to check task existence")?;
        if !exists {
            return Err(TrackerError::TaskNotFound { id: task_id });
        }

        tx.execute(DELETE_DEPENDENCIES_SQL, params![task_id as i64])
            .db_context("Failed to clear dependencies")?;

        for (position, dependency_id) in dependency_ids.iter().enumerate() {
            tx.execute(
                INSERT_DEPENDENCY_SQL,
                params![task_id as i64, *dependency_id as i64, position as i64],
            )
            .db_context("Failed to insert dependency")?;
        }

        let now_str = Timestamp::now().to_string();
        tx.execute(TOUCH_TASK_SQL, params![&now_str, task_id as i64])
            .db_context("Failed to update task timestamp")?;

        let task =
            Self::fetch_task(&tx, task_id)?.ok_or(TrackerError::TaskNotFound { id: task_id })?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(task)
    }

    /// Deletes a task and prunes it from every dependent's edge set.
    ///
    /// A generated task's receipt is kept, so its date is never refilled.
    pub fn delete_task(&mut self, task_id: u64) -> Result<Task> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let task =
            Self::fetch_task(&tx, task_id)?.ok_or(TrackerError::TaskNotFound { id: task_id })?;

        tx.execute(DELETE_TASK_SQL, params![task_id as i64])
            .db_context("Failed to delete task")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(task)
    }
}
