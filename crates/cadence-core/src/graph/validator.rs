//! Dependency validation: edge edits and status gating.
//!
//! Every check runs before the store is touched, so a rejected edit or
//! transition leaves persisted state exactly as it was.
//!
//! Gating reads the dependency set and then writes the new status without
//! holding a lock across the two steps. A concurrent edge edit between them
//! can slip through; graphs are scoped to a single owner, where that window is
//! accepted.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::{DependencyGraph, GraphLimits};
use crate::{
    error::{Result, TrackerError},
    models::{BlockingTask, DependencyStatus, NewTask, Task, TaskStatus},
    store::{GraphNode, GraphStore},
};

/// Drops repeated ids, keeping first occurrences in order.
pub fn dedupe_ids(ids: &[u64]) -> Vec<u64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn require_task<S: GraphStore>(store: &S, task_id: u64) -> Result<Task> {
    store
        .get_task(task_id)?
        .ok_or(TrackerError::TaskNotFound { id: task_id })
}

/// Replaces the dependency set of `task_id` with `dependency_ids`.
///
/// # Errors
///
/// - [`TrackerError::SelfDependency`] if the task's own id is listed
/// - [`TrackerError::DependencyNotFound`] for ids that are missing or belong
///   to another owner
/// - [`TrackerError::CircularDependency`] naming the cycle the edit would close
pub fn set_dependencies<S: GraphStore>(
    store: &mut S,
    task_id: u64,
    dependency_ids: &[u64],
    limits: GraphLimits,
) -> Result<Task> {
    let task = require_task(&*store, task_id)?;
    let ids = dedupe_ids(dependency_ids);

    if ids.contains(&task_id) {
        return Err(TrackerError::SelfDependency { id: task_id });
    }

    let mut graph = DependencyGraph::from_nodes(store.owner_graph(task.owner_id)?);

    let missing: Vec<u64> = ids.iter().copied().filter(|id| !graph.contains(*id)).collect();
    if !missing.is_empty() {
        return Err(TrackerError::DependencyNotFound { ids: missing });
    }

    graph.set_dependencies(task_id, ids.clone());
    if let Some(cycle) = graph.find_cycle_from(task_id, limits)? {
        let chain = cycle.iter().map(|id| graph.name_of(*id)).collect();
        debug!("Rejected dependency edit on task {task_id}: cycle {cycle:?}");
        return Err(TrackerError::CircularDependency { chain });
    }

    store.update_task_dependencies(task_id, &ids)
}

/// Checks the initial dependencies of a task that does not exist yet and
/// returns them deduplicated. Nothing depends on a new task, so no cycle can
/// form.
pub fn check_new_task_dependencies<S: GraphStore>(
    store: &S,
    owner_id: u64,
    dependency_ids: &[u64],
) -> Result<Vec<u64>> {
    let ids = dedupe_ids(dependency_ids);
    let lookup = store.list_tasks_by_ids(&ids)?;

    let foreign = lookup
        .found
        .iter()
        .filter(|task| task.owner_id != owner_id)
        .map(|task| task.id);
    let mut invalid: Vec<u64> = lookup.missing.iter().copied().chain(foreign).collect();
    if !invalid.is_empty() {
        invalid.sort_unstable();
        return Err(TrackerError::DependencyNotFound { ids: invalid });
    }

    Ok(ids)
}

/// Creates a task after validating its initial dependencies.
pub fn create_task<S: GraphStore>(store: &mut S, mut task: NewTask) -> Result<Task> {
    task.dependency_ids =
        check_new_task_dependencies(&*store, task.owner_id, &task.dependency_ids)?;
    store.create_task(&task)
}

/// True iff every dependency resolves to a completed task. Missing
/// dependencies count as unmet.
pub fn can_start<S: GraphStore>(store: &S, task: &Task) -> Result<bool> {
    let lookup = store.list_tasks_by_ids(&task.dependency_ids)?;
    Ok(lookup.missing.is_empty() && lookup.found.iter().all(Task::is_completed))
}

/// Direct dependencies that are not completed, in dependency order.
pub fn blocking_tasks<S: GraphStore>(store: &S, task: &Task) -> Result<Vec<BlockingTask>> {
    let lookup = store.list_tasks_by_ids(&task.dependency_ids)?;
    let found: HashMap<u64, &Task> = lookup.found.iter().map(|t| (t.id, t)).collect();

    Ok(task
        .dependency_ids
        .iter()
        .filter_map(|id| match found.get(id) {
            Some(dependency) if dependency.is_completed() => None,
            Some(dependency) => Some(BlockingTask {
                id: dependency.id,
                name: Some(dependency.name.clone()),
                status: Some(dependency.status),
            }),
            None => Some(BlockingTask::missing(*id)),
        })
        .collect())
}

fn outstanding_for<S: GraphStore>(
    store: &S,
    task: &Task,
    limits: GraphLimits,
) -> Result<Vec<BlockingTask>> {
    let graph = DependencyGraph::from_nodes(store.owner_graph(task.owner_id)?);
    graph.outstanding_prerequisites(task.id, limits)
}

/// Full blocking picture for one task.
pub fn dependency_status<S: GraphStore>(
    store: &S,
    task_id: u64,
    limits: GraphLimits,
) -> Result<DependencyStatus> {
    let task = require_task(store, task_id)?;
    let blocking = blocking_tasks(store, &task)?;
    let outstanding = if blocking.is_empty() {
        Vec::new()
    } else {
        outstanding_for(store, &task, limits)?
    };

    Ok(DependencyStatus {
        task_id,
        can_start: blocking.is_empty(),
        blocking_tasks: blocking,
        outstanding_prerequisites: outstanding,
    })
}

/// Checks whether `task` may move to `target`.
///
/// Moving to [`TaskStatus::Todo`] is always allowed. Every other status
/// requires [`can_start`].
///
/// # Errors
///
/// Returns [`TrackerError::DependencyNotMet`] listing every incomplete
/// upstream task, deepest first.
pub fn validate_transition<S: GraphStore>(
    store: &S,
    task: &Task,
    target: TaskStatus,
    limits: GraphLimits,
) -> Result<()> {
    if !target.is_gated() || can_start(store, task)? {
        return Ok(());
    }

    let mut blocking = outstanding_for(store, task, limits)?;
    if blocking.is_empty() {
        blocking = blocking_tasks(store, task)?;
    }

    Err(TrackerError::DependencyNotMet {
        task_id: task.id,
        blocking: blocking.iter().map(BlockingTask::label).collect(),
    })
}

/// Validates and persists a status change.
pub fn update_status<S: GraphStore>(
    store: &mut S,
    task_id: u64,
    target: TaskStatus,
    limits: GraphLimits,
) -> Result<Task> {
    let task = require_task(&*store, task_id)?;
    validate_transition(&*store, &task, target, limits)?;
    store.update_task_status(task_id, target)
}

/// Tasks that could be added as dependencies of `task_id` without closing a
/// cycle: same owner, same project when the task has one, and neither the
/// task itself nor anything that depends on it.
pub fn available_dependencies<S: GraphStore>(
    store: &S,
    task_id: u64,
    limits: GraphLimits,
) -> Result<Vec<GraphNode>> {
    let task = require_task(store, task_id)?;
    let graph = DependencyGraph::from_nodes(store.owner_graph(task.owner_id)?);
    let dependents = graph.dependents_closure(task_id, limits)?;

    Ok(graph
        .nodes()
        .into_iter()
        .filter(|node| node.id != task_id && !dependents.contains(&node.id))
        .filter(|node| task.project_id.is_none() || node.project_id == task.project_id)
        .cloned()
        .collect())
}
