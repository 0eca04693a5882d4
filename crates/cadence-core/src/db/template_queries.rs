//! Recurring template operations.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension};

use super::utils::{id_column, optional_id_column, parse_column, parse_optional_column};
use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    models::{NewTemplate, RecurrencePattern, RecurringTemplate, Weekdays},
};

const TEMPLATE_COLUMNS: &str = "id, owner_id, project_id, name, description, priority, category, \
     due_time, start_date, active, frequency, interval, weekdays, month_day, end_date, \
     max_instances, created_at, updated_at";
const INSERT_TEMPLATE_SQL: &str = "INSERT INTO recurring_templates (owner_id, project_id, name, description, priority, category, due_time, start_date, active, frequency, interval, weekdays, month_day, end_date, max_instances, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)";
const UPDATE_TEMPLATE_SQL: &str = "UPDATE recurring_templates SET name = ?1, description = ?2, priority = ?3, category = ?4, due_time = ?5, start_date = ?6, active = ?7, frequency = ?8, interval = ?9, weekdays = ?10, month_day = ?11, end_date = ?12, max_instances = ?13, updated_at = ?14 WHERE id = ?15";
const DELETE_TEMPLATE_SQL: &str = "DELETE FROM recurring_templates WHERE id = ?1";

impl super::Database {
    fn build_template_from_row(row: &rusqlite::Row) -> rusqlite::Result<RecurringTemplate> {
        let weekdays_json: String = row.get(12)?;
        let weekdays: Weekdays = serde_json::from_str(&weekdays_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(12, Type::Text, Box::new(e)))?;
        let month_day: Option<i64> = row.get(13)?;

        Ok(RecurringTemplate {
            id: id_column(row, 0)?,
            owner_id: id_column(row, 1)?,
            project_id: optional_id_column(row, 2)?,
            name: row.get(3)?,
            description: row.get(4)?,
            priority: parse_column(row, 5)?,
            category: row.get(6)?,
            due_time: parse_optional_column(row, 7)?,
            start_date: parse_column(row, 8)?,
            active: row.get(9)?,
            pattern: RecurrencePattern {
                frequency: parse_column(row, 10)?,
                interval: row.get(11)?,
                weekdays,
                month_day: month_day.map(|d| d as u8),
                end_date: parse_optional_column(row, 14)?,
                max_instances: row.get(15)?,
            },
            created_at: parse_column(row, 16)?,
            updated_at: parse_column(row, 17)?,
        })
    }

    fn query_templates(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<RecurringTemplate>> {
        let mut stmt = self
            .connection
            .prepare(sql)
            .db_context("Failed to prepare template query")?;
        let templates = stmt
            .query_map(params, Self::build_template_from_row)
            .db_context("Failed to query templates")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch templates")?;
        Ok(templates)
    }

    /// Inserts a validated template.
    pub fn create_template(&mut self, template: &NewTemplate) -> Result<RecurringTemplate> {
        let now = Timestamp::now().to_string();
        let weekdays = serde_json::to_string(&template.pattern.weekdays)?;

        self.connection
            .execute(
                INSERT_TEMPLATE_SQL,
                params![
                    template.owner_id as i64,
                    template.project_id.map(|id| id as i64),
                    &template.name,
                    &template.description,
                    template.priority.as_str(),
                    &template.category,
                    template.due_time.map(|t| t.to_string()),
                    template.start_date.to_string(),
                    template.active,
                    template.pattern.frequency.as_str(),
                    template.pattern.interval,
                    &weekdays,
                    template.pattern.month_day,
                    template.pattern.end_date.map(|d| d.to_string()),
                    template.pattern.max_instances,
                    &now,
                    &now
                ],
            )
            .db_context("Failed to insert template")?;

        let id = self.connection.last_insert_rowid() as u64;
        self.get_template(id)?
            .ok_or(TrackerError::TemplateNotFound { id })
    }

    pub fn get_template(&self, template_id: u64) -> Result<Option<RecurringTemplate>> {
        let sql = format!("SELECT {TEMPLATE_COLUMNS} FROM recurring_templates WHERE id = ?1");
        self.connection
            .query_row(&sql, params![template_id as i64], Self::build_template_from_row)
            .optional()
            .db_context("Failed to get template")
    }

    /// Lists templates, optionally restricted to one owner and to active ones.
    pub fn list_templates(
        &self,
        owner_id: Option<u64>,
        active_only: bool,
    ) -> Result<Vec<RecurringTemplate>> {
        let sql = format!(
            "SELECT {TEMPLATE_COLUMNS} FROM recurring_templates \
             WHERE (?1 IS NULL OR owner_id = ?1) AND (?2 = 0 OR active = 1) \
             ORDER BY id"
        );
        self.query_templates(&sql, params![owner_id.map(|id| id as i64), active_only])
    }

    /// Every active template across all owners, in id order.
    pub fn list_active_templates(&self) -> Result<Vec<RecurringTemplate>> {
        self.list_templates(None, true)
    }

    /// Writes back every mutable field of `template`.
    pub fn save_template(&mut self, template: &RecurringTemplate) -> Result<RecurringTemplate> {
        let now = Timestamp::now().to_string();
        let weekdays = serde_json::to_string(&template.pattern.weekdays)?;

        let updated = self
            .connection
            .execute(
                UPDATE_TEMPLATE_SQL,
                params![
                    &template.name,
                    &template.description,
                    template.priority.as_str(),
                    &template.category,
                    template.due_time.map(|t| t.to_string()),
                    template.start_date.to_string(),
                    template.active,
                    template.pattern.frequency.as_str(),
                    template.pattern.interval,
                    &weekdays,
                    template.pattern.month_day,
                    template.pattern.end_date.map(|d| d.to_string()),
                    template.pattern.max_instances,
                    &now,
                    template.id as i64
                ],
            )
            .db_context("Failed to update template")?;

        if updated == 0 {
            return Err(TrackerError::TemplateNotFound { id: template.id });
        }

        self.get_template(template.id)?
            .ok_or(TrackerError::TemplateNotFound { id: template.id })
    }

    /// Deletes a template. Instances it generated and their receipts stay.
    pub fn delete_template(&mut self, template_id: u64) -> Result<RecurringTemplate> {
        let template = self
            .get_template(template_id)?
            .ok_or(TrackerError::TemplateNotFound { id: template_id })?;

        self.connection
            .execute(DELETE_TEMPLATE_SQL, params![template_id as i64])
            .db_context("Failed to delete template")?;

        Ok(template)
    }
}
