//! Database schema initialization and migrations.

use log::info;
use rusqlite::params;

use crate::{
    error::{DatabaseResultExt, Result},
    models::TaskStatus,
};

const SELECT_NONCANONICAL_STATUSES_SQL: &str = "SELECT DISTINCT status FROM tasks \
     WHERE status NOT IN ('todo', 'in_progress', 'review', 'completed')";
const UPDATE_STATUS_VALUE_SQL: &str = "UPDATE tasks SET status = ?1 WHERE status = ?2";
const HAS_MAX_INSTANCES_SQL: &str =
    "SELECT COUNT(*) FROM pragma_table_info('recurring_templates') WHERE name = 'max_instances'";
const ADD_MAX_INSTANCES_SQL: &str = "ALTER TABLE recurring_templates ADD COLUMN max_instances \
     INTEGER CHECK (max_instances IS NULL OR max_instances >= 1)";

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        // Enable foreign keys for this connection
        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        self.apply_migrations()?;

        Ok(())
    }

    /// Apply database migrations for existing databases
    fn apply_migrations(&self) -> Result<()> {
        let has_max_instances: bool = self
            .connection
            .query_row(HAS_MAX_INSTANCES_SQL, [], |row| row.get(0))
            .db_context("Failed to inspect template columns")?;
        if !has_max_instances {
            info!("Adding max_instances column to recurring_templates");
            self.connection
                .execute(ADD_MAX_INSTANCES_SQL, [])
                .db_context("Failed to add max_instances column")?;
        }

        let migrated = self.migrate_legacy_statuses()?;
        if migrated > 0 {
            info!("Migrated {migrated} tasks with legacy status values");
        }
        Ok(())
    }

    /// Rewrites status strings outside the closed set so they never re-enter
    /// the engine as a fifth state. Returns the number of rows touched.
    ///
    /// Only databases created before the status CHECK constraint can hold such
    /// rows.
    pub fn migrate_legacy_statuses(&self) -> Result<usize> {
        let legacy: Vec<String> = {
            let mut stmt = self
                .connection
                .prepare(SELECT_NONCANONICAL_STATUSES_SQL)
                .db_context("Failed to prepare legacy status query")?;
            let values = stmt
                .query_map([], |row| row.get(0))
                .db_context("Failed to query legacy statuses")?
                .collect::<std::result::Result<Vec<String>, _>>()
                .db_context("Failed to read legacy statuses")?;
            values
        };

        let mut migrated = 0;
        for value in legacy {
            let target = TaskStatus::from_legacy(&value);
            migrated += self
                .connection
                .execute(UPDATE_STATUS_VALUE_SQL, params![target.as_str(), &value])
                .db_context("Failed to migrate legacy status")?;
        }

        Ok(migrated)
    }
}
