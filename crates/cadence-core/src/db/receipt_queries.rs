//! Generation receipts and atomic instance creation.

use jiff::{civil::Date, Timestamp};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::utils::{id_column, is_unique_violation, parse_column};
use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    models::{GenerationReceipt, NewTask, Task},
};

const RECEIPT_COLUMNS: &str = "template_id, generation_date, task_id, created_at";
const INSERT_RECEIPT_SQL: &str = "INSERT INTO generation_receipts (template_id, generation_date, task_id, created_at) VALUES (?1, ?2, ?3, ?4)";
const LATEST_RECEIPT_DATE_SQL: &str =
    "SELECT MAX(generation_date) FROM generation_receipts WHERE template_id = ?1";
const COUNT_RECEIPTS_SQL: &str = "SELECT COUNT(*) FROM generation_receipts WHERE template_id = ?1";
const TEMPLATE_LIMIT_SQL: &str = "SELECT max_instances FROM recurring_templates WHERE id = ?1";

impl super::Database {
    fn build_receipt_from_row(row: &rusqlite::Row) -> rusqlite::Result<GenerationReceipt> {
        Ok(GenerationReceipt {
            template_id: id_column(row, 0)?,
            generation_date: parse_column(row, 1)?,
            task_id: id_column(row, 2)?,
            created_at: parse_column(row, 3)?,
        })
    }

    fn fetch_receipt(
        connection: &Connection,
        template_id: u64,
        date: Date,
    ) -> Result<Option<GenerationReceipt>> {
        let sql = format!(
            "SELECT {RECEIPT_COLUMNS} FROM generation_receipts \
             WHERE template_id = ?1 AND generation_date = ?2"
        );
        connection
            .query_row(
                &sql,
                params![template_id as i64, date.to_string()],
                Self::build_receipt_from_row,
            )
            .optional()
            .db_context("Failed to get generation receipt")
    }

    /// Looks up the receipt for `(template_id, date)`.
    pub fn receipt_for(&self, template_id: u64, date: Date) -> Result<Option<GenerationReceipt>> {
        Self::fetch_receipt(&self.connection, template_id, date)
    }

    /// Most recent date an instance was generated for. ISO dates sort
    /// lexicographically, so `MAX` over the text column is the latest date.
    pub fn latest_receipt_date(&self, template_id: u64) -> Result<Option<Date>> {
        let raw: Option<String> = self
            .connection
            .query_row(LATEST_RECEIPT_DATE_SQL, params![template_id as i64], |row| {
                row.get(0)
            })
            .db_context("Failed to query latest receipt")?;

        raw.map(|value| {
            value.parse::<Date>().map_err(|e| {
                TrackerError::invalid_input("generation_date")
                    .with_reason(format!("stored value '{value}' is not a date: {e}"))
            })
        })
        .transpose()
    }

    fn count_receipts(connection: &Connection, template_id: u64) -> Result<u64> {
        let count: i64 = connection
            .query_row(COUNT_RECEIPTS_SQL, params![template_id as i64], |row| {
                row.get(0)
            })
            .db_context("Failed to count receipts")?;
        Ok(count as u64)
    }

    /// Number of instances ever generated for a template, deleted or
    /// skipped ones included.
    pub fn receipt_count(&self, template_id: u64) -> Result<u64> {
        Self::count_receipts(&self.connection, template_id)
    }

    /// All receipts of a template, oldest date first.
    pub fn receipts_for_template(&self, template_id: u64) -> Result<Vec<GenerationReceipt>> {
        let sql = format!(
            "SELECT {RECEIPT_COLUMNS} FROM generation_receipts \
             WHERE template_id = ?1 ORDER BY generation_date"
        );
        let mut stmt = self
            .connection
            .prepare(&sql)
            .db_context("Failed to prepare receipt query")?;
        let receipts = stmt
            .query_map(params![template_id as i64], Self::build_receipt_from_row)
            .db_context("Failed to query receipts")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch receipts")?;
        Ok(receipts)
    }

    /// Writes a generated task and its receipt as one unit.
    ///
    /// The write lock is taken up front, so of two concurrent callers for the
    /// same pair exactly one commits; the other gets
    /// [`TrackerError::DuplicateGeneration`] and nothing is written. The
    /// template's instance limit is checked under the same lock and reported
    /// as [`TrackerError::InstanceLimitReached`].
    pub fn create_instance(&mut self, task: &NewTask) -> Result<(Task, GenerationReceipt)> {
        let origin = task.origin.ok_or_else(|| {
            TrackerError::invalid_input("origin")
                .with_reason("generated instances must name their template and date")
        })?;
        let duplicate = TrackerError::DuplicateGeneration {
            template_id: origin.template_id,
            date: origin.date,
        };

        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin generation transaction")?;

        if Self::fetch_receipt(&tx, origin.template_id, origin.date)?.is_some() {
            return Err(duplicate);
        }

        let limit: Option<u32> = tx
            .query_row(TEMPLATE_LIMIT_SQL, params![origin.template_id as i64], |row| {
                row.get(0)
            })
            .optional()
            .db_context("Failed to read instance limit")?
            .flatten();
        if let Some(limit) = limit {
            if Self::count_receipts(&tx, origin.template_id)? >= u64::from(limit) {
                return Err(TrackerError::InstanceLimitReached {
                    template_id: origin.template_id,
                    limit,
                });
            }
        }

        let now = Timestamp::now().to_string();
        let task_id = Self::insert_task_row(&tx, task, &now)?;

        match tx.execute(
            INSERT_RECEIPT_SQL,
            params![
                origin.template_id as i64,
                origin.date.to_string(),
                task_id as i64,
                &now
            ],
        ) {
            Ok(_) => {}
            // Dropping the transaction rolls back the task row as well.
            Err(e) if is_unique_violation(&e) => return Err(duplicate),
            Err(e) => {
                return Err(TrackerError::database("Failed to insert receipt").with_source(e));
            }
        }

        let created =
            Self::fetch_task(&tx, task_id)?.ok_or(TrackerError::TaskNotFound { id: task_id })?;
        let receipt = Self::fetch_receipt(&tx, origin.template_id, origin.date)?.ok_or(
            TrackerError::SchedulerTemplate {
                template_id: origin.template_id,
                message: format!("receipt for {} vanished before commit", origin.date),
            },
        )?;

        tx.commit().db_context("Failed to commit generation transaction")?;

        Ok((created, receipt))
    }
}
