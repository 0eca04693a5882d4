//! A single scheduler pass over every active template.

use std::sync::atomic::{AtomicBool, Ordering};

use jiff::{civil::Date, ToSpan};
use log::{debug, info, warn};

use crate::{
    error::{Result, TrackerError},
    generator::{generate_instance, Generation},
    models::{PassSummary, RecurringTemplate, TaskDue, TemplateFailure},
    recurrence::due_dates_between,
    store::GraphStore,
};

/// Dates to evaluate for `template` in a pass for `as_of`.
///
/// Starts the day after the latest receipt, but never earlier than the
/// template's start date or `catch_up_days` before `as_of`. When everything up
/// to `as_of` is covered, `as_of` itself is still re-evaluated; receipts make
/// that a no-op.
pub fn candidate_dates<S: GraphStore>(
    store: &S,
    template: &RecurringTemplate,
    as_of: Date,
    catch_up_days: u32,
) -> Result<Vec<Date>> {
    let window_start = as_of.saturating_sub(i64::from(catch_up_days).days());
    let mut from = window_start.max(template.start_date);

    if let Some(last) = store.latest_receipt_date(template.id)? {
        if let Ok(next) = last.tomorrow() {
            from = from.max(next);
        }
    }
    if from > as_of {
        from = as_of;
    }

    Ok(due_dates_between(template, from, as_of))
}

/// Generates every candidate date of `template`.
///
/// Instances committed before a failure are returned alongside the error so
/// the caller can still report and announce them.
fn process_template<S: GraphStore>(
    store: &mut S,
    template: &RecurringTemplate,
    as_of: Date,
    catch_up_days: u32,
) -> (Vec<TaskDue>, Option<TrackerError>) {
    let mut created = Vec::new();

    let dates = match candidate_dates(&*store, template, as_of, catch_up_days) {
        Ok(dates) => dates,
        Err(e) => return (created, Some(e)),
    };

    for date in dates {
        match generate_instance(store, template, date) {
            Ok(Generation::Created(task, receipt)) => {
                debug!(
                    "Generated task {} from template {} for {}",
                    task.id, template.id, receipt.generation_date
                );
                created.push(TaskDue {
                    task_id: task.id,
                    template_id: template.id,
                    owner_id: task.owner_id,
                    name: task.name,
                    due_date: task.due_date.unwrap_or(date),
                    due_time: task.due_time,
                });
            }
            Ok(Generation::Existing(_)) => {}
            Ok(Generation::LimitReached(limit)) => {
                debug!("Template {} reached its limit of {limit} instances", template.id);
                break;
            }
            Err(e) => return (created, Some(e)),
        }
    }

    (created, None)
}

/// Runs generation for every active template as of `as_of`.
///
/// Templates are processed independently: a failing template is recorded in
/// the summary and the pass moves on. Instances a template created before it
/// failed stay in the summary, so such a template counts as both generated
/// and errored. `cancel` is checked between templates; once set, the pass
/// stops and the summary is marked cancelled. A later pass picks up where
/// this one left off.
///
/// # Errors
///
/// Only a failure to list the active templates aborts the pass.
pub fn run_pass<S: GraphStore>(
    store: &mut S,
    as_of: Date,
    catch_up_days: u32,
    cancel: &AtomicBool,
) -> Result<PassSummary> {
    let templates = store.list_active_templates()?;
    let mut summary = PassSummary::new(as_of);
    summary.templates_seen = templates.len();
    info!(
        "Starting generation pass for {as_of} over {} active templates",
        templates.len()
    );

    for template in &templates {
        if cancel.load(Ordering::SeqCst) {
            info!("Generation pass for {as_of} cancelled");
            summary.cancelled = true;
            break;
        }
        if !template.active {
            summary.skipped += 1;
            continue;
        }

        let (instances, failure) = process_template(store, template, as_of, catch_up_days);
        let created_any = !instances.is_empty();
        if created_any {
            summary.generated += 1;
            summary.instances.extend(instances);
        }
        match failure {
            Some(e) => {
                let failure = TrackerError::SchedulerTemplate {
                    template_id: template.id,
                    message: e.to_string(),
                };
                warn!("{failure}");
                summary.errored += 1;
                summary.errors.push(TemplateFailure {
                    template_id: template.id,
                    template_name: template.name.clone(),
                    message: e.to_string(),
                });
            }
            None if !created_any => summary.skipped += 1,
            None => {}
        }
    }

    info!(
        "Generation pass for {as_of} finished: {} generated, {} skipped, {} errored",
        summary.generated, summary.skipped, summary.errored
    );
    Ok(summary)
}
