//! Injectable source of "today".

use std::sync::{Mutex, PoisonError};

use jiff::{civil::Date, ToSpan, Zoned};

/// Supplies the calendar date a scheduler pass runs for.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// Local calendar date from the system clock and time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        Zoned::now().date()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<Date>,
}

impl FixedClock {
    pub fn new(today: Date) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, date: Date) {
        *self.today.lock().unwrap_or_else(PoisonError::into_inner) = date;
    }

    /// Moves the clock forward by `days`, saturating at the calendar bounds.
    pub fn advance(&self, days: i64) {
        let mut today = self.today.lock().unwrap_or_else(PoisonError::into_inner);
        *today = today.saturating_add(days.days());
    }
}

impl Clock for FixedClock {
    fn today(&self) -> Date {
        *self.today.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(date(2026, 2, 27));
        clock.advance(2);
        assert_eq!(clock.today(), date(2026, 3, 1));
        clock.set(date(2030, 1, 1));
        assert_eq!(clock.today(), date(2030, 1, 1));
    }
}
