//! Recurrence pattern evaluation.
//!
//! Pure date arithmetic: every function takes the dates it reasons about as
//! arguments and never reads the wall clock.

use jiff::{civil::Date, ToSpan};

use crate::models::{Frequency, RecurrencePattern, RecurringTemplate};

/// Upper bound on days scanned by [`next_occurrences`].
const MAX_SCAN_DAYS: i64 = 3_660;

/// Whether `template` has an instance due on `date`.
///
/// The template's `active` flag is not consulted; skipping inactive
/// templates is the scheduler's job.
pub fn should_generate(template: &RecurringTemplate, date: Date) -> bool {
    is_due(&template.pattern, template.start_date, date)
}

/// Whether `pattern`, anchored at `start`, falls on `date`.
///
/// ```rust
/// use cadence_core::{models::RecurrencePattern, recurrence::is_due};
/// use jiff::civil::date;
///
/// let every_other_day = RecurrencePattern::daily(2);
/// let start = date(2026, 3, 1);
/// assert!(is_due(&every_other_day, start, date(2026, 3, 3)));
/// assert!(!is_due(&every_other_day, start, date(2026, 3, 4)));
/// assert!(!is_due(&every_other_day, start, date(2026, 2, 27)));
/// ```
pub fn is_due(pattern: &RecurrencePattern, start: Date, date: Date) -> bool {
    if date < start || pattern.end_date.is_some_and(|end| date > end) {
        return false;
    }
    // Stored patterns are validated, but a zero interval must never divide.
    let interval = i64::from(pattern.interval.max(1));
    let days = days_between(start, date);

    match pattern.frequency {
        Frequency::Daily => days % interval == 0,
        Frequency::Weekly => {
            pattern.weekdays.contains(date.weekday()) && (days / 7) % interval == 0
        }
        Frequency::Monthly => {
            let Some(month_day) = pattern.month_day else {
                return false;
            };
            let effective_day = i8::try_from(month_day)
                .unwrap_or(31)
                .min(date.days_in_month());
            date.day() == effective_day && months_between(start, date) % interval == 0
        }
        Frequency::Custom => {
            pattern.weekdays.contains(date.weekday())
                && occurrences_before(pattern, start, days) % interval == 0
        }
    }
}

/// Whole days from `start` to `date`; both are civil dates so every day is
/// exactly 24 hours.
fn days_between(start: Date, date: Date) -> i64 {
    date.duration_since(start).as_hours() / 24
}

/// Whole months from `start` to `date`.
///
/// A month is complete once `date` reaches `start`'s day of month, or the
/// last day of a shorter month.
fn months_between(start: Date, date: Date) -> i64 {
    let months = i64::from(date.year() - start.year()) * 12
        + i64::from(date.month() - start.month());
    if date.day() < start.day().min(date.days_in_month()) {
        months - 1
    } else {
        months
    }
}

/// Number of selected weekdays in `[start, start + days)`.
fn occurrences_before(pattern: &RecurrencePattern, start: Date, days: i64) -> i64 {
    let per_week = i64::from(pattern.weekdays.len());
    let full_weeks = days / 7;
    let remainder = days % 7;

    let start_offset = start.weekday().to_monday_zero_offset();
    let partial = pattern
        .weekdays
        .iter()
        .filter(|day| {
            let distance = (i64::from(day.to_monday_zero_offset()) - i64::from(start_offset))
                .rem_euclid(7);
            distance < remainder
        })
        .count() as i64;

    full_weeks * per_week + partial
}

/// Dates in `from..=through` on which `template` is due, in order.
pub fn due_dates_between(template: &RecurringTemplate, from: Date, through: Date) -> Vec<Date> {
    let mut dates = Vec::new();
    let mut current = from.max(template.start_date);
    while current <= through {
        if should_generate(template, current) {
            dates.push(current);
        }
        match current.tomorrow() {
            Ok(next) => current = next,
            Err(_) => break,
        }
    }
    dates
}

/// Up to `count` due dates on or after `after`.
pub fn next_occurrences(template: &RecurringTemplate, after: Date, count: usize) -> Vec<Date> {
    let mut dates = Vec::with_capacity(count);
    let mut current = after.max(template.start_date);
    let limit = current.checked_add(MAX_SCAN_DAYS.days()).unwrap_or(Date::MAX);

    while dates.len() < count && current <= limit {
        if template.pattern.end_date.is_some_and(|end| current > end) {
            break;
        }
        if should_generate(template, current) {
            dates.push(current);
        }
        match current.tomorrow() {
            Ok(next) => current = next,
            Err(_) => break,
        }
    }
    dates
}
