mod common;

use std::{collections::HashSet, sync::Arc};

use cadence_core::{
    params::{CreateTemplate, Id, ListTasks, SetDependencies, UpdateStatus},
    scheduler::FixedClock,
    Scheduler, SchedulerConfig, TaskStatus, TrackerError,
};
use common::{add_task, create_test_tracker};
use jiff::civil::date;

async fn complete(
    tracker: &cadence_core::Tracker,
    id: u64,
) -> cadence_core::Result<cadence_core::Task> {
    tracker
        .update_status(&UpdateStatus {
            id,
            status: "completed".to_string(),
        })
        .await
}

#[tokio::test]
async fn test_daily_template_over_three_days() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let start = date(2026, 5, 11);
    let template = tracker
        .create_template(&CreateTemplate {
            owner_id: 1,
            project_id: None,
            name: "Inbox zero".to_string(),
            description: None,
            priority: None,
            category: None,
            due_time: None,
            start_date: start,
            active: true,
            frequency: "daily".to_string(),
            interval: 1,
            weekdays: vec![],
            month_day: None,
            max_instances: None,
            end_date: None,
        })
        .await
        .expect("Failed to create template");

    let clock = Arc::new(FixedClock::new(start));
    let config = SchedulerConfig {
        catch_up_days: 0,
        ..SchedulerConfig::default()
    };
    let scheduler = Scheduler::new(tracker.clone(), config).with_clock(clock.clone());

    for _ in 0..3 {
        scheduler.run_now().await.expect("Pass failed");
        // A repeated pass on the same day is a no-op
        scheduler.run_now().await.expect("Pass failed");
        clock.advance(1);
    }

    let tasks = tracker
        .list_tasks(&ListTasks::default())
        .await
        .expect("Failed to list tasks");
    assert_eq!(tasks.len(), 3);

    let dates: HashSet<_> = tasks.iter().map(|task| task.generation_date).collect();
    assert_eq!(dates.len(), 3);
    assert!(tasks
        .iter()
        .all(|task| task.recurring_template_id == Some(template.id)));
    assert!(dates.contains(&Some(date(2026, 5, 13))));
}

#[tokio::test]
async fn test_chain_completes_in_order() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let a = add_task(&tracker, "A", vec![]).await;
    let b = add_task(&tracker, "B", vec![a]).await;
    let c = add_task(&tracker, "C", vec![b]).await;
    let d = add_task(&tracker, "D", vec![c]).await;

    match complete(&tracker, d).await {
        Err(TrackerError::DependencyNotMet { blocking, .. }) => {
            assert_eq!(blocking, vec!["A", "B", "C"]);
        }
        other => panic!("expected DependencyNotMet, got {other:?}"),
    }

    for (id, d_ready) in [(a, false), (b, false), (c, true)] {
        complete(&tracker, id)
            .await
            .expect("Prerequisite should complete");
        let ready = tracker.can_start(&Id { id: d }).await.expect("can_start");
        assert_eq!(ready, d_ready);
    }

    let done = complete(&tracker, d).await.expect("D should complete");
    assert_eq!(done.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_self_dependency_is_rejected() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let base = add_task(&tracker, "Base", vec![]).await;
    let x = add_task(&tracker, "X", vec![base]).await;

    let result = tracker
        .set_dependencies(&SetDependencies {
            id: x,
            dependency_ids: vec![x],
        })
        .await;
    assert!(matches!(result, Err(TrackerError::SelfDependency { id }) if id == x));

    let stored = tracker
        .get_task(&Id { id: x })
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(stored.dependency_ids, vec![base]);
}

#[tokio::test]
async fn test_cycle_is_rejected_and_nothing_changes() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let other = add_task(&tracker, "Other", vec![]).await;
    let b = add_task(&tracker, "B", vec![other]).await;
    let a = add_task(&tracker, "A", vec![b]).await;

    let result = tracker
        .set_dependencies(&SetDependencies {
            id: b,
            dependency_ids: vec![other, a],
        })
        .await;
    match result {
        Err(TrackerError::CircularDependency { chain }) => {
            assert_eq!(chain.first(), chain.last());
            assert!(chain.contains(&"A".to_string()));
        }
        other => panic!("expected CircularDependency, got {other:?}"),
    }

    let a_task = tracker.get_task(&Id { id: a }).await.expect("get").expect("a");
    let b_task = tracker.get_task(&Id { id: b }).await.expect("get").expect("b");
    assert_eq!(a_task.dependency_ids, vec![b]);
    assert_eq!(b_task.dependency_ids, vec![other]);
}

#[tokio::test]
async fn test_dependencies_are_scoped_to_owner() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let mine = add_task(&tracker, "Mine", vec![]).await;
    let theirs = tracker
        .create_task(&cadence_core::params::CreateTask {
            owner_id: 2,
            name: "Theirs".to_string(),
            ..cadence_core::params::CreateTask::default()
        })
        .await
        .expect("Failed to create task")
        .id;

    let result = tracker
        .set_dependencies(&SetDependencies {
            id: mine,
            dependency_ids: vec![theirs],
        })
        .await;
    match result {
        Err(TrackerError::DependencyNotFound { ids }) => assert_eq!(ids, vec![theirs]),
        other => panic!("expected DependencyNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_review_is_gated_but_todo_is_not() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let a = add_task(&tracker, "A", vec![]).await;
    let b = add_task(&tracker, "B", vec![a]).await;

    let review = tracker
        .update_status(&UpdateStatus {
            id: b,
            status: "review".to_string(),
        })
        .await;
    assert!(matches!(review, Err(TrackerError::DependencyNotMet { .. })));

    let todo = tracker
        .update_status(&UpdateStatus {
            id: b,
            status: "todo".to_string(),
        })
        .await
        .expect("Todo is always allowed");
    assert_eq!(todo.status, TaskStatus::Todo);
}
