//! Display implementations for domain models.
//!
//! Kept apart from the model definitions; every implementation writes
//! markdown.

use std::fmt;

use super::datetime::{format_due, LocalDateTime};
use crate::models::{
    BlockingTask, DependencyStatus, Frequency, PassSummary, Priority, RecurrencePattern,
    RecurringTemplate, Task, TaskDue, TaskStatus,
};

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.weekdays.names().join(", ");
        let n = self.interval;

        match (self.frequency, n) {
            (Frequency::Daily, 1) => write!(f, "every day")?,
            (Frequency::Daily, _) => write!(f, "every {n} days")?,
            (Frequency::Weekly, 1) => write!(f, "every week on {days}")?,
            (Frequency::Weekly, _) => write!(f, "every {n} weeks on {days}")?,
            (Frequency::Monthly, _) => {
                let day = self
                    .month_day
                    .map_or_else(|| "?".to_string(), |d| d.to_string());
                if n == 1 {
                    write!(f, "every month on day {day}")?;
                } else {
                    write!(f, "every {n} months on day {day}")?;
                }
            }
            (Frequency::Custom, 1) => write!(f, "every {days}")?,
            (Frequency::Custom, _) => write!(f, "every {n} occurrences of {days}")?,
        }

        if let Some(end) = self.end_date {
            write!(f, " until {end}")?;
        }
        if let Some(max) = self.max_instances {
            write!(f, ", at most {max} times")?;
        }
        Ok(())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.name)?;
        writeln!(f)?;

        writeln!(f, "- Status: {}", self.status.with_icon())?;
        writeln!(f, "- Priority: {}", self.priority)?;
        writeln!(f, "- Owner: {}", self.owner_id)?;
        if let Some(project) = self.project_id {
            writeln!(f, "- Project: {project}")?;
        }
        if let Some(category) = &self.category {
            writeln!(f, "- Category: {category}")?;
        }
        if let Some(due) = format_due(self.due_date, self.due_time) {
            writeln!(f, "- Due: {due}")?;
        }
        if !self.dependency_ids.is_empty() {
            let ids: Vec<String> = self.dependency_ids.iter().map(|id| format!("#{id}")).collect();
            writeln!(f, "- Depends on: {}", ids.join(", "))?;
        }
        if let (Some(template_id), Some(date)) =
            (self.recurring_template_id, self.generation_date)
        {
            writeln!(f, "- Generated from template #{template_id} for {date}")?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        Ok(())
    }
}

impl fmt::Display for RecurringTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.name)?;
        writeln!(f)?;

        writeln!(f, "- Schedule: {}", self.pattern)?;
        writeln!(f, "- Starts: {}", self.start_date)?;
        writeln!(f, "- Active: {}", if self.active { "yes" } else { "no" })?;
        writeln!(f, "- Priority: {}", self.priority)?;
        writeln!(f, "- Owner: {}", self.owner_id)?;
        if let Some(project) = self.project_id {
            writeln!(f, "- Project: {project}")?;
        }
        if let Some(category) = &self.category {
            writeln!(f, "- Category: {category}")?;
        }
        if let Some(time) = self.due_time {
            writeln!(f, "- Due at: {}", time.strftime("%H:%M"))?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        Ok(())
    }
}

impl fmt::Display for BlockingTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (#{}, {})", self.label(), self.id, status.with_icon()),
            None => write!(f, "{}", self.label()),
        }
    }
}

impl fmt::Display for DependencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.can_start {
            writeln!(f, "## Task {} can start", self.task_id)?;
            return Ok(());
        }

        writeln!(f, "## Task {} is blocked", self.task_id)?;
        writeln!(f)?;
        writeln!(f, "### Blocking dependencies")?;
        writeln!(f)?;
        for blocker in &self.blocking_tasks {
            writeln!(f, "- {blocker}")?;
        }

        if !self.outstanding_prerequisites.is_empty() {
            writeln!(f)?;
            writeln!(f, "### Outstanding prerequisites")?;
            writeln!(f)?;
            for (position, blocker) in self.outstanding_prerequisites.iter().enumerate() {
                writeln!(f, "{}. {blocker}", position + 1)?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for TaskDue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} (template #{})", self.task_id, self.name, self.template_id)?;
        if let Some(due) = format_due(Some(self.due_date), self.due_time) {
            write!(f, ", due {due}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Generation pass for {}", self.as_of)?;
        writeln!(f)?;
        writeln!(f, "- Templates: {}", self.templates_seen)?;
        writeln!(f, "- Generated: {}", self.generated)?;
        writeln!(f, "- Skipped: {}", self.skipped)?;
        writeln!(f, "- Errored: {}", self.errored)?;
        if self.cancelled {
            writeln!(f, "- Cancelled before every template was visited")?;
        }

        if !self.instances.is_empty() {
            writeln!(f)?;
            writeln!(f, "## New tasks")?;
            writeln!(f)?;
            for instance in &self.instances {
                writeln!(f, "- {instance}")?;
            }
        }

        if !self.errors.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Errors")?;
            writeln!(f)?;
            for error in &self.errors {
                writeln!(
                    f,
                    "- Template {} ({}): {}",
                    error.template_id, error.template_name, error.message
                )?;
            }
        }

        Ok(())
    }
}
