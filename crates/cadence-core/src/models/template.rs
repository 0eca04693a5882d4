//! Recurring task templates and their recurrence patterns.

use std::{fmt, str::FromStr};

use jiff::{
    civil::{Date, Time, Weekday},
    Timestamp,
};
use serde::{Deserialize, Serialize};

use super::Priority;
use crate::error::{Result, TrackerError};

/// How often a template repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every N days
    Daily,
    /// Every N weeks on the selected weekdays
    Weekly,
    /// Every N months on a fixed day of month
    Monthly,
    /// Every Nth occurrence of the selected weekdays
    Custom,
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "custom" => Ok(Frequency::Custom),
            _ => Err(format!("Invalid frequency: {s}")),
        }
    }
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Custom => "custom",
        }
    }

    fn needs_weekdays(self) -> bool {
        matches!(self, Frequency::Weekly | Frequency::Custom)
    }
}

/// A set of weekdays stored as a Monday-first bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct Weekdays(u8);

const WEEKDAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

impl Weekdays {
    pub const fn empty() -> Self {
        Self(0)
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.to_monday_zero_offset()
    }

    #[must_use]
    pub fn with(mut self, day: Weekday) -> Self {
        self.insert(day);
        self
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of selected weekdays.
    pub fn len(&self) -> u32 {
        self.0.count_ones()
    }

    /// Selected weekdays, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        (0..7i8)
            .filter_map(|offset| Weekday::from_monday_zero_offset(offset).ok())
            .filter(|day| self.contains(*day))
    }

    /// Lowercase English names, Monday first.
    pub fn names(&self) -> Vec<String> {
        self.iter()
            .map(|day| WEEKDAY_NAMES[day.to_monday_zero_offset() as usize].to_string())
            .collect()
    }

    fn parse_day(name: &str) -> std::result::Result<Weekday, String> {
        let lowered = name.trim().to_lowercase();
        if lowered.len() < 3 {
            return Err(format!("Invalid weekday: {name}"));
        }
        WEEKDAY_NAMES
            .iter()
            .position(|full| full.starts_with(lowered.as_str()))
            .and_then(|offset| Weekday::from_monday_zero_offset(offset as i8).ok())
            .ok_or_else(|| format!("Invalid weekday: {name}"))
    }
}

impl FromIterator<Weekday> for Weekdays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter().fold(Weekdays::empty(), Weekdays::with)
    }
}

impl FromStr for Weekdays {
    type Err = String;

    /// Parses a comma-separated list such as `mon,wed,friday`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Weekdays::parse_day)
            .collect()
    }
}

impl TryFrom<Vec<String>> for Weekdays {
    type Error = String;

    fn try_from(names: Vec<String>) -> std::result::Result<Self, Self::Error> {
        names
            .iter()
            .map(String::as_str)
            .map(Weekdays::parse_day)
            .collect()
    }
}

impl From<Weekdays> for Vec<String> {
    fn from(days: Weekdays) -> Self {
        days.names()
    }
}

impl fmt::Display for Weekdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(","))
    }
}

/// Scheduling rule owned by a [`RecurringTemplate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurrencePattern {
    pub frequency: Frequency,

    /// Every N days/weeks/months, or every N matching occurrences for Custom
    pub interval: u32,

    /// Required and non-empty for Weekly and Custom
    #[serde(default)]
    pub weekdays: Weekdays,

    /// Required for Monthly; clamped to the last day of shorter months
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_day: Option<u8>,

    /// Last date an instance may be generated for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,

    /// Total instances the template may ever generate, counted by receipts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_instances: Option<u32>,
}

impl RecurrencePattern {
    pub fn daily(interval: u32) -> Self {
        Self {
            frequency: Frequency::Daily,
            interval,
            weekdays: Weekdays::empty(),
            month_day: None,
            end_date: None,
            max_instances: None,
        }
    }

    pub fn weekly(interval: u32, weekdays: Weekdays) -> Self {
        Self {
            frequency: Frequency::Weekly,
            weekdays,
            ..Self::daily(interval)
        }
    }

    pub fn monthly(interval: u32, month_day: u8) -> Self {
        Self {
            frequency: Frequency::Monthly,
            month_day: Some(month_day),
            ..Self::daily(interval)
        }
    }

    pub fn custom(interval: u32, weekdays: Weekdays) -> Self {
        Self {
            frequency: Frequency::Custom,
            weekdays,
            ..Self::daily(interval)
        }
    }

    #[must_use]
    pub fn until(mut self, end_date: Date) -> Self {
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn limited(mut self, max_instances: u32) -> Self {
        self.max_instances = Some(max_instances);
        self
    }

    /// Whether `generated` instances already exhaust the limit.
    pub fn limit_reached(&self, generated: u64) -> bool {
        self.max_instances.is_some_and(|max| generated >= u64::from(max))
    }

    /// Checks the pattern invariants before anything is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidInput`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(TrackerError::invalid_input("interval").with_reason("must be at least 1"));
        }

        if self.frequency.needs_weekdays() && self.weekdays.is_empty() {
            return Err(TrackerError::invalid_input("weekdays").with_reason(format!(
                "at least one weekday is required for {} patterns",
                self.frequency.as_str()
            )));
        }

        if self.frequency == Frequency::Monthly {
            match self.month_day {
                Some(day) if (1..=31).contains(&day) => {}
                Some(day) => {
                    return Err(TrackerError::invalid_input("month_day")
                        .with_reason(format!("{day} is outside 1-31")));
                }
                None => {
                    return Err(TrackerError::invalid_input("month_day")
                        .with_reason("required for monthly patterns"));
                }
            }
        }

        if self.max_instances == Some(0) {
            return Err(TrackerError::invalid_input("max_instances")
                .with_reason("must be at least 1 when set"));
        }

        Ok(())
    }
}

/// A reusable specification for generating task instances on a schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringTemplate {
    pub id: u64,

    pub owner_id: u64,

    /// Project every generated instance is placed in
    pub project_id: Option<u64>,

    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    pub category: Option<String>,

    pub due_time: Option<Time>,

    /// Anchor for interval arithmetic
    pub start_date: Date,

    /// Inactive templates are skipped by the scheduler but remain editable
    pub active: bool,

    pub pattern: RecurrencePattern,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,
}

impl RecurringTemplate {
    /// Validates the pattern together with the template-level date bounds.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidInput`] for an empty name, an invalid
    /// pattern, or an end date before the start date.
    pub fn validate(&self) -> Result<()> {
        validate_template_fields(&self.name, self.start_date, &self.pattern)
    }
}

pub(crate) fn validate_template_fields(
    name: &str,
    start_date: Date,
    pattern: &RecurrencePattern,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TrackerError::invalid_input("name").with_reason("must not be empty"));
    }
    pattern.validate()?;
    if let Some(end) = pattern.end_date {
        if end < start_date {
            return Err(TrackerError::invalid_input("end_date")
                .with_reason(format!("{end} is before start date {start_date}")));
        }
    }
    Ok(())
}
