//! Database operations and SQLite management for tasks and templates.
//!
//! This is the persistence side of the graph store: SQLite connections,
//! schema management, and specialized query interfaces for tasks, dependency
//! edges, recurring templates and generation receipts. Uniqueness of
//! `(template_id, generation_date)` receipts is enforced by the schema's
//! primary key, not by application code.

use std::{path::Path, time::Duration};

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod migrations;
pub mod receipt_queries;
pub mod task_queries;
pub mod template_queries;
pub mod utils;

/// How long a connection waits on a locked database before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
