//! Instance generation from recurring templates.

use jiff::civil::Date;
use log::debug;

use crate::{
    error::{Result, TrackerError},
    models::{GenerationOrigin, GenerationReceipt, NewTask, RecurringTemplate, Task},
    store::GraphStore,
};

/// Outcome of [`generate_instance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    /// This call created the task and its receipt
    Created(Task, GenerationReceipt),
    /// An earlier or concurrent call already generated the instance
    Existing(GenerationReceipt),
    /// The template has generated its `max_instances`; nothing was written
    LimitReached(u32),
}

impl Generation {
    /// The task recorded in the receipt, if there is one.
    pub fn task_id(&self) -> Option<u64> {
        match self {
            Generation::Created(task, _) => Some(task.id),
            Generation::Existing(receipt) => Some(receipt.task_id),
            Generation::LimitReached(_) => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Generation::Created(..))
    }
}

/// Builds the task for `template` due on `date`. Template fields are copied
/// verbatim; the task starts in Todo with no dependencies.
pub fn build_instance(template: &RecurringTemplate, date: Date) -> NewTask {
    NewTask {
        owner_id: template.owner_id,
        project_id: template.project_id,
        name: template.name.clone(),
        description: template.description.clone(),
        priority: template.priority,
        category: template.category.clone(),
        due_date: Some(date),
        due_time: template.due_time,
        dependency_ids: Vec::new(),
        origin: Some(GenerationOrigin {
            template_id: template.id,
            date,
        }),
    }
}

/// Materializes the instance of `template` for `date` at most once.
///
/// Calling this twice for the same pair, sequentially or concurrently, leaves
/// exactly one task and one receipt. A lost race against another writer is
/// reported as [`Generation::Existing`] carrying the winner's receipt. Once
/// the template's receipts reach `max_instances`, new dates yield
/// [`Generation::LimitReached`].
///
/// # Errors
///
/// Store failures are returned as is. The internal duplicate and limit
/// signals never escape this function.
pub fn generate_instance<S: GraphStore>(
    store: &mut S,
    template: &RecurringTemplate,
    date: Date,
) -> Result<Generation> {
    if let Some(receipt) = store.receipt_for(template.id, date)? {
        return Ok(Generation::Existing(receipt));
    }
    if let Some(limit) = template.pattern.max_instances {
        if template.pattern.limit_reached(store.receipt_count(template.id)?) {
            return Ok(Generation::LimitReached(limit));
        }
    }

    match store.create_instance(&build_instance(template, date)) {
        Ok((task, receipt)) => Ok(Generation::Created(task, receipt)),
        Err(TrackerError::InstanceLimitReached { template_id, limit }) => {
            debug!("Template {template_id} reached its limit of {limit} instances");
            Ok(Generation::LimitReached(limit))
        }
        Err(TrackerError::DuplicateGeneration { template_id, date }) => {
            debug!("Instance for template {template_id} on {date} was created concurrently");
            store
                .receipt_for(template_id, date)?
                .map(Generation::Existing)
                .ok_or_else(|| TrackerError::SchedulerTemplate {
                    template_id,
                    message: format!("duplicate reported for {date} but no receipt found"),
                })
        }
        Err(e) => Err(e),
    }
}
