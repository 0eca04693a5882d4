//! Tests for graph traversal and dependency validation.

use super::{validator, DependencyGraph, GraphLimits};
use crate::{
    db::Database,
    models::{NewTask, Task, TaskStatus},
    store::GraphNode,
    TrackerError,
};
use tempfile::TempDir;

fn node(id: u64, name: &str, status: TaskStatus, deps: &[u64]) -> GraphNode {
    GraphNode {
        id,
        project_id: None,
        name: name.to_string(),
        status,
        dependency_ids: deps.to_vec(),
    }
}

/// Helper function to create a test database
fn create_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::new(temp_dir.path().join("test.db")).expect("Failed to open database");
    (temp_dir, db)
}

fn add_task(db: &mut Database, owner_id: u64, name: &str, deps: &[u64]) -> Task {
    validator::create_task(
        db,
        NewTask {
            owner_id,
            name: name.to_string(),
            dependency_ids: deps.to_vec(),
            ..NewTask::default()
        },
    )
    .expect("Failed to create task")
}

fn complete(db: &mut Database, id: u64) {
    validator::update_status(db, id, TaskStatus::Completed, GraphLimits::default())
        .expect("Failed to complete task");
}

#[test]
fn test_find_cycle_returns_chain() {
    let graph = DependencyGraph::from_nodes([
        node(1, "A", TaskStatus::Todo, &[2]),
        node(2, "B", TaskStatus::Todo, &[1]),
    ]);

    let cycle = graph
        .find_cycle_from(2, GraphLimits::default())
        .expect("traversal within budget");
    assert_eq!(cycle, Some(vec![2, 1, 2]));
}

#[test]
fn test_find_cycle_ignores_diamonds() {
    let graph = DependencyGraph::from_nodes([
        node(1, "A", TaskStatus::Todo, &[]),
        node(2, "B", TaskStatus::Todo, &[1]),
        node(3, "C", TaskStatus::Todo, &[1]),
        node(4, "D", TaskStatus::Todo, &[2, 3]),
    ]);

    assert_eq!(
        graph.find_cycle_from(4, GraphLimits::default()).expect("ok"),
        None
    );
}

#[test]
fn test_find_cycle_respects_traversal_budget() {
    let nodes = (1..=50).map(|id| node(id, "n", TaskStatus::Todo, &[id + 1]));
    let graph = DependencyGraph::from_nodes(nodes);

    let result = graph.find_cycle_from(1, GraphLimits { max_traversal: 10 });
    assert!(matches!(result, Err(TrackerError::InvalidInput { .. })));
}

#[test]
fn test_outstanding_prerequisites_deepest_first() {
    let graph = DependencyGraph::from_nodes([
        node(1, "A", TaskStatus::Todo, &[]),
        node(2, "B", TaskStatus::Todo, &[1]),
        node(3, "C", TaskStatus::Todo, &[2]),
        node(4, "D", TaskStatus::Todo, &[3]),
    ]);

    let names: Vec<String> = graph
        .outstanding_prerequisites(4, GraphLimits::default())
        .expect("ok")
        .iter()
        .map(|b| b.label())
        .collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn test_outstanding_prerequisites_stops_at_completed_and_reports_missing() {
    let graph = DependencyGraph::from_nodes([
        node(1, "A", TaskStatus::Todo, &[]),
        node(2, "B", TaskStatus::Completed, &[1]),
        node(3, "C", TaskStatus::Todo, &[2, 99]),
    ]);

    let names: Vec<String> = graph
        .outstanding_prerequisites(3, GraphLimits::default())
        .expect("ok")
        .iter()
        .map(|b| b.label())
        .collect();
    assert_eq!(names, vec!["missing task #99"]);
}

#[test]
fn test_dependents_closure_is_transitive() {
    let graph = DependencyGraph::from_nodes([
        node(1, "A", TaskStatus::Todo, &[]),
        node(2, "B", TaskStatus::Todo, &[1]),
        node(3, "C", TaskStatus::Todo, &[2]),
        node(4, "D", TaskStatus::Todo, &[]),
    ]);

    let dependents = graph
        .dependents_closure(1, GraphLimits::default())
        .expect("ok");
    assert!(dependents.contains(&2));
    assert!(dependents.contains(&3));
    assert!(!dependents.contains(&4));
}

#[test]
fn test_self_dependency_rejected_and_edges_kept() {
    let (_temp_dir, mut db) = create_test_db();
    let a = add_task(&mut db, 1, "A", &[]);
    let x = add_task(&mut db, 1, "X", &[a.id]);

    let result = validator::set_dependencies(&mut db, x.id, &[x.id], GraphLimits::default());
    assert!(matches!(result, Err(TrackerError::SelfDependency { id }) if id == x.id));

    let stored = db.get_task(x.id).expect("query").expect("exists");
    assert_eq!(stored.dependency_ids, vec![a.id]);
}

#[test]
fn test_cycle_rejected_and_both_sets_unchanged() {
    let (_temp_dir, mut db) = create_test_db();
    let b = add_task(&mut db, 1, "B", &[]);
    let a = add_task(&mut db, 1, "A", &[b.id]);

    let result = validator::set_dependencies(&mut db, b.id, &[a.id], GraphLimits::default());
    match result {
        Err(TrackerError::CircularDependency { chain }) => {
            assert_eq!(chain, vec!["B", "A", "B"]);
        }
        other => panic!("expected circular dependency, got {other:?}"),
    }

    let a_after = db.get_task(a.id).expect("query").expect("exists");
    let b_after = db.get_task(b.id).expect("query").expect("exists");
    assert_eq!(a_after.dependency_ids, vec![b.id]);
    assert!(b_after.dependency_ids.is_empty());
}

#[test]
fn test_dependencies_must_belong_to_owner() {
    let (_temp_dir, mut db) = create_test_db();
    let mine = add_task(&mut db, 1, "Mine", &[]);
    let theirs = add_task(&mut db, 2, "Theirs", &[]);

    let result =
        validator::set_dependencies(&mut db, mine.id, &[theirs.id, 404], GraphLimits::default());
    match result {
        Err(TrackerError::DependencyNotFound { ids }) => assert_eq!(ids, vec![theirs.id, 404]),
        other => panic!("expected not found, got {other:?}"),
    }

    let create = validator::create_task(
        &mut db,
        NewTask {
            owner_id: 1,
            name: "New".to_string(),
            dependency_ids: vec![theirs.id],
            ..NewTask::default()
        },
    );
    assert!(matches!(create, Err(TrackerError::DependencyNotFound { .. })));
}

#[test]
fn test_set_dependencies_replaces_and_dedupes() {
    let (_temp_dir, mut db) = create_test_db();
    let a = add_task(&mut db, 1, "A", &[]);
    let b = add_task(&mut db, 1, "B", &[]);
    let c = add_task(&mut db, 1, "C", &[a.id]);

    let updated =
        validator::set_dependencies(&mut db, c.id, &[b.id, b.id, a.id], GraphLimits::default())
            .expect("valid edit");
    assert_eq!(updated.dependency_ids, vec![b.id, a.id]);

    let cleared =
        validator::set_dependencies(&mut db, c.id, &[], GraphLimits::default()).expect("clear");
    assert!(cleared.dependency_ids.is_empty());
}

#[test]
fn test_transition_gating() {
    let (_temp_dir, mut db) = create_test_db();
    let a = add_task(&mut db, 1, "A", &[]);
    let b = add_task(&mut db, 1, "B", &[a.id]);
    let limits = GraphLimits::default();

    for target in [TaskStatus::InProgress, TaskStatus::Review, TaskStatus::Completed] {
        match validator::update_status(&mut db, b.id, target, limits) {
            Err(TrackerError::DependencyNotMet { blocking, .. }) => {
                assert_eq!(blocking, vec!["A"]);
            }
            other => panic!("expected {target:?} to be blocked, got {other:?}"),
        }
    }

    let reset = validator::update_status(&mut db, b.id, TaskStatus::Todo, limits)
        .expect("reset is always allowed");
    assert_eq!(reset.status, TaskStatus::Todo);

    complete(&mut db, a.id);
    let started = validator::update_status(&mut db, b.id, TaskStatus::Review, limits)
        .expect("prerequisite done");
    assert_eq!(started.status, TaskStatus::Review);
}

#[test]
fn test_completed_task_can_return_to_todo_while_blocked() {
    let (_temp_dir, mut db) = create_test_db();
    let a = add_task(&mut db, 1, "A", &[]);
    let b = add_task(&mut db, 1, "B", &[a.id]);
    let limits = GraphLimits::default();

    complete(&mut db, a.id);
    complete(&mut db, b.id);
    validator::update_status(&mut db, a.id, TaskStatus::Todo, limits).expect("reset A");

    let b_now = db.get_task(b.id).expect("query").expect("exists");
    assert!(!validator::can_start(&db, &b_now).expect("can_start"));
    let reset = validator::update_status(&mut db, b.id, TaskStatus::Todo, limits)
        .expect("reset B regardless of A");
    assert_eq!(reset.status, TaskStatus::Todo);
}

#[test]
fn test_deleted_dependency_is_pruned() {
    let (_temp_dir, mut db) = create_test_db();
    let a = add_task(&mut db, 1, "A", &[]);
    let b = add_task(&mut db, 1, "B", &[a.id]);

    db.delete_task(a.id).expect("delete");

    let b_after = db.get_task(b.id).expect("query").expect("exists");
    assert!(b_after.dependency_ids.is_empty());
    assert!(validator::can_start(&db, &b_after).expect("can_start"));
}

#[test]
fn test_blocking_tasks_are_direct_and_ordered() {
    let (_temp_dir, mut db) = create_test_db();
    let a = add_task(&mut db, 1, "A", &[]);
    let b = add_task(&mut db, 1, "B", &[a.id]);
    let c = add_task(&mut db, 1, "C", &[]);
    let d = add_task(&mut db, 1, "D", &[c.id, b.id]);
    complete(&mut db, c.id);

    let status =
        validator::dependency_status(&db, d.id, GraphLimits::default()).expect("status");
    assert!(!status.can_start);
    let direct: Vec<String> = status.blocking_tasks.iter().map(|t| t.label()).collect();
    let transitive: Vec<String> = status
        .outstanding_prerequisites
        .iter()
        .map(|t| t.label())
        .collect();
    assert_eq!(direct, vec!["B"]);
    assert_eq!(transitive, vec!["A", "B"]);
}

#[test]
fn test_available_dependencies_excludes_dependents() {
    let (_temp_dir, mut db) = create_test_db();
    let a = add_task(&mut db, 1, "A", &[]);
    let b = add_task(&mut db, 1, "B", &[a.id]);
    let c = add_task(&mut db, 1, "C", &[b.id]);
    let d = add_task(&mut db, 1, "D", &[]);
    add_task(&mut db, 2, "Other owner", &[]);

    let available: Vec<u64> =
        validator::available_dependencies(&db, a.id, GraphLimits::default())
            .expect("available")
            .iter()
            .map(|n| n.id)
            .collect();
    assert_eq!(available, vec![d.id]);

    let for_c: Vec<u64> = validator::available_dependencies(&db, c.id, GraphLimits::default())
        .expect("available")
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(for_c, vec![a.id, b.id, d.id]);
}

#[test]
fn test_missing_dependency_fails_closed() {
    let (_temp_dir, db) = create_test_db();
    let now = jiff::Timestamp::now();
    let orphan = Task {
        id: 10,
        owner_id: 1,
        project_id: None,
        name: "Orphan".to_string(),
        description: None,
        priority: Default::default(),
        category: None,
        status: TaskStatus::Todo,
        due_date: None,
        due_time: None,
        dependency_ids: vec![77],
        recurring_template_id: None,
        generation_date: None,
        created_at: now,
        updated_at: now,
    };

    assert!(!validator::can_start(&db, &orphan).expect("can_start"));
    let blocking = validator::blocking_tasks(&db, &orphan).expect("blocking");
    assert_eq!(blocking[0].label(), "missing task #77");
}
