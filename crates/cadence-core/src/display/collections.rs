//! Collection wrapper types for displaying groups of domain objects.

use std::{fmt, ops::Index};

use crate::{
    models::{RecurringTemplate, Task},
    store::GraphNode,
};

/// Shared accessors for the newtype collections below.
macro_rules! collection_wrapper {
    ($name:ident, $item:ty) => {
        impl $name {
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn get(&self, index: usize) -> Option<&$item> {
                self.0.get(index)
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }
        }

        impl Index<usize> for $name {
            type Output = $item;

            fn index(&self, index: usize) -> &Self::Output {
                &self.0[index]
            }
        }

        impl IntoIterator for $name {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<Self::Item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }
    };
}

/// Newtype wrapper for displaying task lists in compact form.
///
/// # Examples
///
/// ```rust
/// use cadence_core::display::Tasks;
///
/// assert_eq!(Tasks(vec![]).to_string(), "No tasks found.\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Tasks(pub Vec<Task>);

collection_wrapper!(Tasks, Task);

impl fmt::Display for Tasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No tasks found.");
        }
        for task in &self.0 {
            write!(f, "- **{}. {}** ({})", task.id, task.name, task.status.with_icon())?;
            if let Some(due) = super::datetime::format_due(task.due_date, task.due_time) {
                write!(f, ", due {due}")?;
            }
            if !task.dependency_ids.is_empty() {
                write!(f, ", depends on {}", join_ids(&task.dependency_ids))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying recurring templates.
#[derive(Debug, Clone, Default)]
pub struct Templates(pub Vec<RecurringTemplate>);

collection_wrapper!(Templates, RecurringTemplate);

impl fmt::Display for Templates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No templates found.");
        }
        for template in &self.0 {
            let state = if template.active { "" } else { " (inactive)" };
            writeln!(
                f,
                "- **{}. {}**{state}: {}",
                template.id, template.name, template.pattern
            )?;
        }
        Ok(())
    }
}

/// Tasks that may be added as dependencies of another task.
#[derive(Debug, Clone, Default)]
pub struct Candidates(pub Vec<GraphNode>);

collection_wrapper!(Candidates, GraphNode);

impl fmt::Display for Candidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No tasks available as dependencies.");
        }
        for node in &self.0 {
            writeln!(f, "- {}. {} ({})", node.id, node.name, node.status.with_icon())?;
        }
        Ok(())
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| format!("#{id}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use jiff::{civil::date, Timestamp};

    use super::*;
    use crate::models::{Priority, RecurrencePattern, TaskStatus, Weekdays};

    fn create_test_task() -> Task {
        let ts = Timestamp::from_second(1_767_225_600).unwrap();
        Task {
            id: 4,
            owner_id: 1,
            project_id: None,
            name: "Ship release".to_string(),
            description: None,
            priority: Priority::High,
            category: None,
            status: TaskStatus::InProgress,
            due_date: Some(date(2026, 1, 9)),
            due_time: None,
            dependency_ids: vec![2, 3],
            recurring_template_id: None,
            generation_date: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_tasks_display() {
        let output = Tasks(vec![create_test_task()]).to_string();
        assert_eq!(
            output,
            "- **4. Ship release** (➤ In Progress), due 2026-01-09, depends on #2, #3\n"
        );
    }

    #[test]
    fn test_templates_display_marks_inactive() {
        let ts = Timestamp::from_second(1_767_225_600).unwrap();
        let template = RecurringTemplate {
            id: 2,
            owner_id: 1,
            project_id: None,
            name: "Review inbox".to_string(),
            description: None,
            priority: Priority::Medium,
            category: None,
            due_time: None,
            start_date: date(2026, 1, 5),
            active: false,
            pattern: RecurrencePattern::weekly(1, "mon,fri".parse::<Weekdays>().unwrap()),
            created_at: ts,
            updated_at: ts,
        };

        let output = Templates(vec![template]).to_string();
        assert!(output.contains("**2. Review inbox** (inactive)"));
        assert!(output.contains("every week on monday, friday"));
        assert_eq!(Templates(vec![]).to_string(), "No templates found.\n");
    }
}
