//! Validated request types built from [`crate::params`].

use jiff::civil::{Date, Time};

use super::{
    template::validate_template_fields, Frequency, NewTask, Priority, RecurrencePattern,
    RecurringTemplate, TaskStatus, Weekdays,
};
use crate::{
    error::{Result, TrackerError},
    params,
};

fn parse_priority(value: Option<&str>) -> Result<Priority> {
    value
        .map(|p| {
            p.parse::<Priority>()
                .map_err(|reason| TrackerError::invalid_input("priority").with_reason(reason))
        })
        .transpose()
        .map(Option::unwrap_or_default)
}

fn parse_weekdays(names: Vec<String>) -> Result<Weekdays> {
    Weekdays::try_from(names)
        .map_err(|reason| TrackerError::invalid_input("weekdays").with_reason(reason))
}

fn parse_frequency(value: &str) -> Result<Frequency> {
    value
        .parse::<Frequency>()
        .map_err(|reason| TrackerError::invalid_input("frequency").with_reason(reason))
}

/// Parses a status string at the write boundary.
pub fn parse_status(value: &str) -> Result<TaskStatus> {
    value
        .parse::<TaskStatus>()
        .map_err(|reason| TrackerError::invalid_input("status").with_reason(reason))
}

impl TryFrom<params::CreateTask> for NewTask {
    type Error = TrackerError;

    fn try_from(params: params::CreateTask) -> Result<Self> {
        if params.name.trim().is_empty() {
            return Err(TrackerError::invalid_input("name").with_reason("must not be empty"));
        }
        let priority = parse_priority(params.priority.as_deref())?;

        Ok(NewTask {
            owner_id: params.owner_id,
            project_id: params.project_id,
            name: params.name,
            description: params.description,
            priority,
            category: params.category,
            due_date: params.due_date,
            due_time: params.due_time,
            dependency_ids: params.dependency_ids,
            origin: None,
        })
    }
}

/// Filter for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub owner_id: Option<u64>,
    pub project_id: Option<u64>,
    pub status: Option<TaskStatus>,
    pub template_id: Option<u64>,
}

impl TryFrom<params::ListTasks> for TaskFilter {
    type Error = TrackerError;

    fn try_from(params: params::ListTasks) -> Result<Self> {
        Ok(TaskFilter {
            owner_id: params.owner_id,
            project_id: params.project_id,
            status: params.status.as_deref().map(parse_status).transpose()?,
            template_id: params.template_id,
        })
    }
}

/// A template ready to be inserted; validated on construction.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub owner_id: u64,
    pub project_id: Option<u64>,
    pub name: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub category: Option<String>,
    pub due_time: Option<Time>,
    pub start_date: Date,
    pub active: bool,
    pub pattern: RecurrencePattern,
}

impl TryFrom<params::CreateTemplate> for NewTemplate {
    type Error = TrackerError;

    fn try_from(params: params::CreateTemplate) -> Result<Self> {
        let pattern = RecurrencePattern {
            frequency: parse_frequency(&params.frequency)?,
            interval: params.interval,
            weekdays: parse_weekdays(params.weekdays)?,
            month_day: params.month_day,
            end_date: params.end_date,
            max_instances: params.max_instances,
        };
        validate_template_fields(&params.name, params.start_date, &pattern)?;

        Ok(NewTemplate {
            owner_id: params.owner_id,
            project_id: params.project_id,
            name: params.name,
            description: params.description,
            priority: parse_priority(params.priority.as_deref())?,
            category: params.category,
            due_time: params.due_time,
            start_date: params.start_date,
            active: params.active,
            pattern,
        })
    }
}

/// Partial update for a template. `None` leaves a field untouched.
#[derive(Debug, Default)]
pub struct TemplateChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub due_time: Option<Time>,
    pub start_date: Option<Date>,
    pub active: Option<bool>,
    pub frequency: Option<Frequency>,
    pub interval: Option<u32>,
    pub weekdays: Option<Weekdays>,
    pub month_day: Option<u8>,
    pub end_date: Option<Option<Date>>,
    pub max_instances: Option<Option<u32>>,
}

impl TemplateChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.due_time.is_none()
            && self.start_date.is_none()
            && self.active.is_none()
            && self.frequency.is_none()
            && self.interval.is_none()
            && self.weekdays.is_none()
            && self.month_day.is_none()
            && self.end_date.is_none()
            && self.max_instances.is_none()
    }

    /// Applies the changes to `template` and revalidates the result, leaving
    /// `template` untouched on failure. Returns a description of each change.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidInput`] when the merged template breaks a
    /// pattern invariant.
    pub fn apply_to(self, template: &mut RecurringTemplate) -> Result<Vec<String>> {
        let mut next = template.clone();
        let mut changes = Vec::new();

        if let Some(name) = self.name {
            changes.push(format!("Renamed to '{name}'"));
            next.name = name;
        }
        if let Some(description) = self.description {
            changes.push("Updated description".to_string());
            next.description = Some(description);
        }
        if let Some(priority) = self.priority {
            changes.push(format!("Priority set to {}", priority.as_str()));
            next.priority = priority;
        }
        if let Some(category) = self.category {
            changes.push(format!("Category set to {category}"));
            next.category = Some(category);
        }
        if let Some(due_time) = self.due_time {
            changes.push(format!("Due time set to {due_time}"));
            next.due_time = Some(due_time);
        }
        if let Some(start_date) = self.start_date {
            changes.push(format!("Start date set to {start_date}"));
            next.start_date = start_date;
        }
        if let Some(active) = self.active {
            changes.push(if active { "Activated" } else { "Deactivated" }.to_string());
            next.active = active;
        }
        if let Some(frequency) = self.frequency {
            changes.push(format!("Frequency set to {}", frequency.as_str()));
            next.pattern.frequency = frequency;
        }
        if let Some(interval) = self.interval {
            changes.push(format!("Interval set to {interval}"));
            next.pattern.interval = interval;
        }
        if let Some(weekdays) = self.weekdays {
            changes.push(format!("Weekdays set to {weekdays}"));
            next.pattern.weekdays = weekdays;
        }
        if let Some(month_day) = self.month_day {
            changes.push(format!("Month day set to {month_day}"));
            next.pattern.month_day = Some(month_day);
        }
        if let Some(end_date) = self.end_date {
            changes.push(match end_date {
                Some(date) => format!("End date set to {date}"),
                None => "End date cleared".to_string(),
            });
            next.pattern.end_date = end_date;
        }
        if let Some(max_instances) = self.max_instances {
            changes.push(match max_instances {
                Some(max) => format!("Instance limit set to {max}"),
                None => "Instance limit cleared".to_string(),
            });
            next.pattern.max_instances = max_instances;
        }

        next.validate()?;
        *template = next;
        Ok(changes)
    }
}

impl TryFrom<params::UpdateTemplate> for TemplateChanges {
    type Error = TrackerError;

    fn try_from(params: params::UpdateTemplate) -> Result<Self> {
        if params.clear_end_date && params.end_date.is_some() {
            return Err(TrackerError::invalid_input("end_date")
                .with_reason("cannot both set and clear the end date"));
        }
        if params.clear_max_instances && params.max_instances.is_some() {
            return Err(TrackerError::invalid_input("max_instances")
                .with_reason("cannot both set and clear the instance limit"));
        }

        Ok(TemplateChanges {
            name: params.name,
            description: params.description,
            priority: params
                .priority
                .as_deref()
                .map(|p| parse_priority(Some(p)))
                .transpose()?,
            category: params.category,
            due_time: params.due_time,
            start_date: params.start_date,
            active: params.active,
            frequency: params.frequency.as_deref().map(parse_frequency).transpose()?,
            interval: params.interval,
            weekdays: params.weekdays.map(parse_weekdays).transpose()?,
            month_day: params.month_day,
            end_date: if params.clear_end_date {
                Some(None)
            } else {
                params.end_date.map(Some)
            },
            max_instances: if params.clear_max_instances {
                Some(None)
            } else {
                params.max_instances.map(Some)
            },
        })
    }
}
