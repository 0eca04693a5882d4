//! Display formatting for models, collections and operation results.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and operation outcomes get newtype wrappers. Every formatter
//! produces markdown, which the CLI renders with termimad.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Collections &   │    │   Markdown      │
//! │ (Task, Template)│───▶│ Result Types    │───▶│    Output       │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! - [`collections`]: `Tasks`, `Templates`, `Candidates`
//! - [`results`]: `CreateResult`, `UpdateResult`, `DeleteResult`
//! - [`status`]: `OperationStatus`
//! - [`datetime`]: `LocalDateTime`
//! - [`models`]: Display for tasks, templates, dependency status and pass
//!   summaries
//!
//! # Example
//!
//! ```rust
//! use cadence_core::display::OperationStatus;
//!
//! let done = OperationStatus::success("Generated 2 tasks".to_string());
//! assert_eq!(done.to_string(), "Success: Generated 2 tasks\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Candidates, Tasks, Templates};
pub use datetime::LocalDateTime;
pub use results::{CreateResult, DeleteResult, UpdateResult};
pub use status::OperationStatus;
