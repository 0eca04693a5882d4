//! Status and priority enumerations for tasks.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of task statuses.
///
/// The set is closed: nothing else is persisted or accepted. Values written by
/// older releases are rewritten through [`TaskStatus::from_legacy`] when the
/// store is opened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Todo,

    /// Being worked on
    InProgress,

    /// Waiting on review
    Review,

    /// Finished
    Completed,
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "review" => Ok(TaskStatus::Review),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl TaskStatus {
    /// All four statuses in workflow order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Completed,
    ];

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Completed => "completed",
        }
    }

    /// Maps any historical status string onto the closed set.
    ///
    /// Canonical values map to themselves. Known drift (`not_started`,
    /// `on_hold`, `done`, `in-progress`) maps to its modern equivalent and
    /// anything unrecognised falls back to [`TaskStatus::Todo`].
    pub fn from_legacy(value: &str) -> TaskStatus {
        let normalized = value.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "in_progress" | "inprogress" | "doing" | "started" => TaskStatus::InProgress,
            "review" | "in_review" => TaskStatus::Review,
            "completed" | "done" | "complete" | "finished" => TaskStatus::Completed,
            _ => TaskStatus::Todo,
        }
    }

    /// Whether moving into this status requires every prerequisite to be
    /// completed.
    pub fn is_gated(&self) -> bool {
        !matches!(self, TaskStatus::Todo)
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// ```rust
    /// use cadence_core::models::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(TaskStatus::Todo.with_icon(), "○ Todo");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            TaskStatus::Completed => "✓ Completed",
            TaskStatus::Review => "◎ Review",
            TaskStatus::InProgress => "➤ In Progress",
            TaskStatus::Todo => "○ Todo",
        }
    }
}

/// Task priority, copied verbatim from templates into generated instances.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("Invalid priority: {s}")),
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}
