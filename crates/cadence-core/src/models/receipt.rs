//! Generation receipts: the idempotency guard for recurring instances.

use jiff::{civil::Date, Timestamp};
use serde::{Deserialize, Serialize};

/// Proof that the instance for `(template_id, generation_date)` exists.
///
/// The store holds at most one receipt per pair; receipts are written in the
/// same transaction as their task and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationReceipt {
    pub template_id: u64,
    pub generation_date: Date,
    /// Task written together with the receipt. The task may since have been
    /// deleted by its owner; the receipt stays so the date is not refilled.
    pub task_id: u64,
    pub created_at: Timestamp,
}
