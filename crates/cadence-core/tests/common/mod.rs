use cadence_core::{params::CreateTask, Tracker, TrackerBuilder};
use tempfile::TempDir;

/// Helper function to create a test tracker
pub async fn create_test_tracker() -> (TempDir, Tracker) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let tracker = TrackerBuilder::new()
        .with_database_path(&db_path)
        .build()
        .await
        .expect("Failed to create tracker");
    (temp_dir, tracker)
}

/// Creates a task for owner 1 and returns its id.
#[allow(dead_code)]
pub async fn add_task(tracker: &Tracker, name: &str, dependency_ids: Vec<u64>) -> u64 {
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
