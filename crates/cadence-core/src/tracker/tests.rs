//! Tests for the tracker facade.

use jiff::civil::date;
use tempfile::TempDir;

use super::*;
use crate::{
    models::TaskStatus,
    params::{
        CreateTask, CreateTemplate, Id, ListTasks, ListTemplates, SetDependencies, UpdateStatus,
        UpdateTemplate,
    },
    scheduler::{Scheduler, SchedulerConfig},
};

/// Helper function to create a test tracker
async fn create_test_tracker() -> (TempDir, Tracker) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let tracker = TrackerBuilder::new()
        .with_database_path(&db_path)
        .build()
        .await
        .expect("Failed to create tracker");
    (temp_dir, tracker)
}

async fn add_task(tracker: &Tracker, name: &str, dependency_ids: Vec<u64>) -> u64 {
    tracker
        .create_task(&CreateTask {
            owner_id: 1,
            name: name.to_string(),
            dependency_ids,
            ..CreateTask::default()
        })
        .await
        .expect("Failed to create task")
        .id
}

async fn set_status(tracker: &Tracker, id: u64, status: &str) -> Result<crate::models::Task> {
    tracker
        .update_status(&UpdateStatus {
            id,
            status: status.to_string(),
        })
        .await
}

fn weekly_template() -> CreateTemplate {
    CreateTemplate {
        owner_id: 1,
        project_id: None,
        name: "Team sync".to_string(),
        description: None,
        priority: Some("high".to_string()),
        category: None,
        due_time: None,
        start_date: date(2026, 1, 5),
        active: true,
        frequency: "weekly".to_string(),
        interval: 1,
        weekdays: vec!["tue".to_string()],
        month_day: None,
        max_instances: None,
        end_date: None,
    }
}

#[tokio::test]
async fn test_builder_rejects_zero_traversal_budget() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let result = TrackerBuilder::new()
        .with_database_path(temp_dir.path().join("test.db"))
        .with_max_traversal(0)
        .build()
        .await;

    assert!(matches!(result, Err(TrackerError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_builder_creates_parent_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("nested").join("data").join("cadence.db");
    let tracker = TrackerBuilder::new()
        .with_database_path(&db_path)
        .build()
        .await
        .expect("Failed to create tracker");

    assert_eq!(tracker.database_path(), db_path.as_path());
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_create_and_get_task() {
    let (_temp_dir, tracker) = create_test_tracker().await;

    let task = tracker
        .create_task(&CreateTask {
            owner_id: 1,
            name: "Book venue".to_string(),
            priority: Some("high".to_string()),
            due_date: Some(date(2026, 2, 14)),
            ..CreateTask::default()
        })
        .await
        .expect("Failed to create task");

    assert_eq!(task.status, TaskStatus::Todo);
    assert!(!task.is_generated());

    let fetched = tracker
        .get_task(&Id { id: task.id })
        .await
        .expect("Failed to get task")
        .expect("Task should exist");
    assert_eq!(fetched, task);

    let missing = tracker.get_task(&Id { id: 999 }).await.expect("query");
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_create_task_rejects_missing_dependency() {
    let (_temp_dir, tracker) = create_test_tracker().await;

    let result = tracker
        .create_task(&CreateTask {
            owner_id: 1,
            name: "Orphan".to_string(),
            dependency_ids: vec![42],
            ..CreateTask::default()
        })
        .await;

    match result {
        Err(TrackerError::DependencyNotFound { ids }) => assert_eq!(ids, vec![42]),
        other => panic!("expected DependencyNotFound, got {other:?}"),
    }
    let tasks = tracker.list_tasks(&ListTasks::default()).await.expect("list");
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn test_list_tasks_filters_by_status() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let first = add_task(&tracker, "First", vec![]).await;
    add_task(&tracker, "Second", vec![]).await;
    set_status(&tracker, first, "completed")
        .await
        .expect("Failed to complete task");

    let completed = tracker
        .list_tasks(&ListTasks {
            status: Some("completed".to_string()),
            ..ListTasks::default()
        })
        .await
        .expect("list");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].name, "First");

    let other_owner = tracker
        .list_tasks(&ListTasks {
            owner_id: Some(2),
            ..ListTasks::default()
        })
        .await
        .expect("list");
    assert!(other_owner.is_empty());
}

#[tokio::test]
async fn test_status_gate_and_release() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let design = add_task(&tracker, "Design", vec![]).await;
    let build = add_task(&tracker, "Build", vec![design]).await;

    assert!(!tracker.can_start(&Id { id: build }).await.expect("can_start"));
    match set_status(&tracker, build, "in_progress").await {
        Err(TrackerError::DependencyNotMet { task_id, blocking }) => {
            assert_eq!(task_id, build);
            assert_eq!(blocking, vec!["Design".to_string()]);
        }
        other => panic!("expected DependencyNotMet, got {other:?}"),
    }

    set_status(&tracker, design, "completed")
        .await
        .expect("Failed to complete design");
    assert!(tracker.can_start(&Id { id: build }).await.expect("can_start"));
    let started = set_status(&tracker, build, "in_progress")
        .await
        .expect("Failed to start build");
    assert_eq!(started.status, TaskStatus::InProgress);
}

#[tokio::test]
async fn test_update_status_rejects_unknown_value() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let id = add_task(&tracker, "Anything", vec![]).await;

    let result = set_status(&tracker, id, "on_hold").await;
    assert!(matches!(result, Err(TrackerError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_set_dependencies_rejects_cycle() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let a = add_task(&tracker, "A", vec![]).await;
    let b = add_task(&tracker, "B", vec![a]).await;

    let result = tracker
        .set_dependencies(&SetDependencies {
            id: a,
            dependency_ids: vec![b],
        })
        .await;
    assert!(matches!(result, Err(TrackerError::CircularDependency { .. })));

    let a_task = tracker
        .get_task(&Id { id: a })
        .await
        .expect("get")
        .expect("exists");
    assert!(a_task.dependency_ids.is_empty());
}

#[tokio::test]
async fn test_blockers_and_dependency_status() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let a = add_task(&tracker, "A", vec![]).await;
    let b = add_task(&tracker, "B", vec![a]).await;
    let c = add_task(&tracker, "C", vec![b]).await;

    let direct = tracker.blocking_tasks(&Id { id: c }).await.expect("blockers");
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].id, b);

    let status = tracker
        .dependency_status(&Id { id: c })
        .await
        .expect("status");
    assert!(!status.can_start);
    let chain: Vec<u64> = status
        .outstanding_prerequisites
        .iter()
        .map(|blocker| blocker.id)
        .collect();
    assert_eq!(chain, vec![a, b]);

    let missing = tracker.blocking_tasks(&Id { id: 999 }).await;
    assert!(matches!(missing, Err(TrackerError::TaskNotFound { id: 999 })));
}

#[tokio::test]
async fn test_available_dependencies_exclude_dependents() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let a = add_task(&tracker, "A", vec![]).await;
    let b = add_task(&tracker, "B", vec![a]).await;
    let c = add_task(&tracker, "C", vec![]).await;

    let candidates = tracker
        .available_dependencies(&Id { id: a })
        .await
        .expect("candidates");
    let ids: Vec<u64> = candidates.iter().map(|node| node.id).collect();
    assert_eq!(ids, vec![c]);
    assert!(!ids.contains(&b));
}

#[tokio::test]
async fn test_delete_task_prunes_dependents() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let a = add_task(&tracker, "A", vec![]).await;
    let b = add_task(&tracker, "B", vec![a]).await;

    let deleted = tracker.delete_task(&Id { id: a }).await.expect("delete");
    assert_eq!(deleted.name, "A");

    assert!(tracker.can_start(&Id { id: b }).await.expect("can_start"));
    let again = tracker.delete_task(&Id { id: a }).await;
    assert!(matches!(again, Err(TrackerError::TaskNotFound { .. })));
}

#[tokio::test]
async fn test_template_lifecycle() {
    let (_temp_dir, tracker) = create_test_tracker().await;

    let template = tracker
        .create_template(&weekly_template())
        .await
        .expect("Failed to create template");
    assert!(template.active);

    let updated = tracker
        .update_template(&UpdateTemplate {
            id: template.id,
            weekdays: Some(vec!["tue".to_string(), "thu".to_string()]),
            active: Some(false),
            ..UpdateTemplate::default()
        })
        .await
        .expect("Failed to update template");
    assert_eq!(updated.changes.len(), 2);
    assert!(!updated.resource.active);
    assert_eq!(updated.resource.pattern.weekdays.len(), 2);

    let active = tracker
        .list_templates(&ListTemplates {
            owner_id: Some(1),
            active_only: true,
        })
        .await
        .expect("list");
    assert!(active.is_empty());
    let all = tracker
        .list_templates(&ListTemplates::default())
        .await
        .expect("list");
    assert_eq!(all.len(), 1);

    let deleted = tracker
        .delete_template(&Id { id: template.id })
        .await
        .expect("delete");
    assert_eq!(deleted.name, "Team sync");
    assert!(tracker
        .get_template(&Id { id: template.id })
        .await
        .expect("get")
        .is_none());
}

#[tokio::test]
async fn test_invalid_template_update_is_not_saved() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let template = tracker
        .create_template(&weekly_template())
        .await
        .expect("Failed to create template");

    let result = tracker
        .update_template(&UpdateTemplate {
            id: template.id,
            frequency: Some("monthly".to_string()),
            ..UpdateTemplate::default()
        })
        .await;
    assert!(matches!(result, Err(TrackerError::InvalidInput { .. })));

    let empty = tracker
        .update_template(&UpdateTemplate {
            id: template.id,
            ..UpdateTemplate::default()
        })
        .await;
    assert!(matches!(empty, Err(TrackerError::InvalidInput { .. })));

    let unchanged = tracker
        .get_template(&Id { id: template.id })
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(unchanged, template);
}

#[tokio::test]
async fn test_create_template_rejects_invalid_pattern() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let mut params = weekly_template();
    params.interval = 0;

    let result = tracker.create_template(&params).await;
    match result {
        Err(TrackerError::InvalidInput { field, .. }) => assert_eq!(field, "interval"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }

    let missing = tracker
        .update_template(&UpdateTemplate {
            id: 77,
            name: Some("Ghost".to_string()),
            ..UpdateTemplate::default()
        })
        .await;
    assert!(matches!(missing, Err(TrackerError::TemplateNotFound { id: 77 })));
}

#[tokio::test]
async fn test_template_instances_and_skip() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let template = tracker
        .create_template(&weekly_template())
        .await
        .expect("Failed to create template");
    let plain = add_task(&tracker, "Standalone", vec![]).await;

    let scheduler = Scheduler::new(
        tracker.clone(),
        SchedulerConfig {
            catch_up_days: 14,
            ..SchedulerConfig::default()
        },
    );
    scheduler.run_pass(date(2026, 1, 14)).await.expect("pass");

    let instances = tracker
        .template_instances(&Id { id: template.id })
        .await
        .expect("instances");
    let dates: Vec<_> = instances.iter().map(|task| task.generation_date).collect();
    assert_eq!(dates, vec![Some(date(2026, 1, 6)), Some(date(2026, 1, 13))]);

    let skipped = tracker
        .skip_instance(&Id { id: instances[0].id })
        .await
        .expect("skip");
    assert_eq!(skipped.generation_date, Some(date(2026, 1, 6)));

    let rerun = scheduler.run_pass(date(2026, 1, 14)).await.expect("pass");
    assert!(rerun.instances.is_empty());
    let remaining = tracker
        .list_tasks(&ListTasks {
            template_id: Some(template.id),
            ..ListTasks::default()
        })
        .await
        .expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].generation_date, Some(date(2026, 1, 13)));

    let not_generated = tracker.skip_instance(&Id { id: plain }).await;
    assert!(matches!(not_generated, Err(TrackerError::InvalidInput { .. })));
    let missing = tracker.skip_instance(&Id { id: 999 }).await;
    assert!(matches!(missing, Err(TrackerError::TaskNotFound { id: 999 })));
    let unknown = tracker.template_instances(&Id { id: 999 }).await;
    assert!(matches!(unknown, Err(TrackerError::TemplateNotFound { id: 999 })));
}

#[tokio::test]
async fn test_instance_limit_can_be_set_and_cleared() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let template = tracker
        .create_template(&CreateTemplate {
            max_instances: Some(3),
            ..weekly_template()
        })
        .await
        .expect("Failed to create template");
    assert_eq!(template.pattern.max_instances, Some(3));

    let zero = tracker
        .update_template(&UpdateTemplate {
            id: template.id,
            max_instances: Some(0),
            ..UpdateTemplate::default()
        })
        .await;
    match zero {
        Err(TrackerError::InvalidInput { field, .. }) => assert_eq!(field, "max_instances"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }

    let cleared = tracker
        .update_template(&UpdateTemplate {
            id: template.id,
            clear_max_instances: true,
            ..UpdateTemplate::default()
        })
        .await
        .expect("clear");
    assert_eq!(cleared.resource.pattern.max_instances, None);
    assert_eq!(cleared.changes, vec!["Instance limit cleared".to_string()]);
}
