//! Parameter structures for cadence operations
//!
//! Shared, interface-agnostic parameter structures. Front ends (the `cad`
//! CLI today) define their own argument types with framework derives and
//! convert into these with `From`, so core stays free of clap:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │  Core Params    │    │ Validated       │
//! │  (clap derives) │───▶│ (this module)   │───▶│ requests/models │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! String-typed fields (status, priority, frequency, weekdays) are parsed and
//! validated when they cross into [`crate::models`], so every write boundary
//! rejects values outside the closed enums.

use jiff::civil::{Date, Time};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    models::{requests::parse_status, TaskStatus},
};

/// Generic parameters for operations requiring just an ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// Parameters for creating a task directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning user
    pub owner_id: u64,
    pub project_id: Option<u64>,
    /// Name of the task (required, non-empty)
    pub name: String,
    pub description: Option<String>,
    /// 'low', 'medium' or 'high'; defaults to medium
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<Date>,
    pub due_time: Option<Time>,
    /// Initial prerequisites; must belong to the same owner
    #[serde(default)]
    pub dependency_ids: Vec<u64>,
}

/// Parameters for listing tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTasks {
    pub owner_id: Option<u64>,
    pub project_id: Option<u64>,
    /// Only tasks in this status
    pub status: Option<String>,
    /// Only instances generated from this template
    pub template_id: Option<u64>,
}

/// Parameters for a status change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStatus {
    /// Task ID to update
    pub id: u64,
    /// 'todo', 'in_progress', 'review' or 'completed'
    pub status: String,
}

impl UpdateStatus {
    /// Parse the requested status into the closed enum.
    ///
    /// ```rust
    /// use cadence_core::{models::TaskStatus, params::UpdateStatus};
    ///
    /// let params = UpdateStatus { id: 1, status: "review".to_string() };
    /// assert_eq!(params.validate()?, TaskStatus::Review);
    ///
    /// let params = UpdateStatus { id: 1, status: "on_hold".to_string() };
    /// assert!(params.validate().is_err());
    /// # cadence_core::Result::<()>::Ok(())
    /// ```
    pub fn validate(&self) -> Result<TaskStatus> {
        parse_status(&self.status)
    }
}

/// Parameters for replacing a task's dependency set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetDependencies {
    pub id: u64,
    /// The complete new edge set; old edges are discarded
    #[serde(default)]
    pub dependency_ids: Vec<u64>,
}

/// Parameters for creating a recurring template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplate {
    pub owner_id: u64,
    pub project_id: Option<u64>,
    pub name: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due_time: Option<Time>,
    pub start_date: Date,
    #[serde(default = "default_active")]
    pub active: bool,
    /// 'daily', 'weekly', 'monthly' or 'custom'
    pub frequency: String,
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Weekday names, required for weekly and custom frequencies
    #[serde(default)]
    pub weekdays: Vec<String>,
    /// Day of month (1-31), required for monthly frequency
    pub month_day: Option<u8>,
    /// Stop generating once this many instances exist
    pub max_instances: Option<u32>,
    pub end_date: Option<Date>,
}

fn default_active() -> bool {
    true
}

fn default_interval() -> u32 {
    1
}

/// Parameters for a partial template update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplate {
    pub id: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due_time: Option<Time>,
    pub start_date: Option<Date>,
    pub active: Option<bool>,
    pub frequency: Option<String>,
    pub interval: Option<u32>,
    pub weekdays: Option<Vec<String>>,
    pub month_day: Option<u8>,
    pub max_instances: Option<u32>,
    pub end_date: Option<Date>,
    /// Remove the end date so the template repeats indefinitely
    #[serde(default)]
    pub clear_end_date: bool,
    /// Remove the instance limit
    #[serde(default)]
    pub clear_max_instances: bool,
}

/// Parameters for listing templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTemplates {
    pub owner_id: Option<u64>,
    /// Only templates the scheduler will visit
    #[serde(default)]
    pub active_only: bool,
}

/// Parameters for a manual generation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratePass {
    /// Date to generate for; defaults to the scheduler clock's today
    pub date: Option<Date>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrackerError;

    #[test]
    fn test_update_status_accepts_canonical_values() {
        for (raw, expected) in [
            ("todo", TaskStatus::Todo),
            ("in_progress", TaskStatus::InProgress),
            ("inprogress", TaskStatus::InProgress),
            ("review", TaskStatus::Review),
            ("completed", TaskStatus::Completed),
        ] {
            let params = UpdateStatus {
                id: 1,
                status: raw.to_string(),
            };
            assert_eq!(params.validate().expect("valid status"), expected);
        }
    }

    #[test]
    fn test_update_status_rejects_legacy_values() {
        for raw in ["not_started", "on_hold", "done", ""] {
            let params = UpdateStatus {
                id: 1,
                status: raw.to_string(),
            };
            match params.validate() {
                Err(TrackerError::InvalidInput { field, .. }) => assert_eq!(field, "status"),
                other => panic!("expected invalid status for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_create_template_serde_defaults() {
        let params: CreateTemplate = serde_json::from_str(
            r#"{"owner_id":1,"project_id":null,"name":"Standup","description":null,
                "priority":null,"category":null,"due_time":null,
                "start_date":"2026-01-05","frequency":"daily","month_day":null,
                "end_date":null}"#,
        )
        .expect("deserialize");
        assert!(params.active);
        assert_eq!(params.interval, 1);
        assert!(params.weekdays.is_empty());
    }
}
