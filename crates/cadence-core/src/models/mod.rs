//! Data models for tasks, recurring templates and generation receipts.
//!
//! Display implementations for these models live in
//! [`crate::display::models`], keeping presentation apart from the data.
//!
//! # Examples
//!
//! ```rust
//! use cadence_core::models::{RecurrencePattern, Weekdays};
//! use jiff::civil::Weekday;
//!
//! let pattern = RecurrencePattern::weekly(2, Weekdays::empty().with(Weekday::Monday));
//! assert!(pattern.validate().is_ok());
//!
//! let broken = RecurrencePattern::weekly(1, Weekdays::empty());
//! assert!(broken.validate().is_err());
//! ```

pub mod receipt;
pub mod requests;
pub mod status;
pub mod summary;
pub mod task;
pub mod template;

#[cfg(test)]
mod tests;

pub use receipt::GenerationReceipt;
pub use requests::{NewTemplate, TaskFilter, TemplateChanges};
pub use status::{Priority, TaskStatus};
pub use summary::{BlockingTask, DependencyStatus, PassSummary, TaskDue, TemplateFailure};
pub use task::{GenerationOrigin, NewTask, Task};
pub use template::{Frequency, RecurrencePattern, RecurringTemplate, Weekdays};
