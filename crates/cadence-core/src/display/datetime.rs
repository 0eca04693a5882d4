//! DateTime display utilities.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// A wrapper around `Timestamp` that formats it in the system time zone as
/// `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// Formats an optional due date and time as `2026-05-01 09:30`, `2026-05-01`
/// or `09:30`.
pub(crate) fn format_due(
    date: Option<jiff::civil::Date>,
    time: Option<jiff::civil::Time>,
) -> Option<String> {
    let time = time.map(|t| t.strftime("%H:%M").to_string());
    match (date, time) {
        (Some(date), Some(time)) => Some(format!("{date} {time}")),
        (Some(date), None) => Some(date.to_string()),
        (None, Some(time)) => Some(time),
        (None, None) => None,
    }
}
