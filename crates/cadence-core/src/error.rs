//! Error types for the task engine.

use std::path::PathBuf;

use jiff::civil::Date;
use thiserror::Error;

/// Comprehensive error type for all tracker operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Task not found for the given ID
    #[error("Task with ID {id} not found")]
    TaskNotFound { id: u64 },
    /// Recurring template not found for the given ID
    #[error("Recurring template with ID {id} not found")]
    TemplateNotFound { id: u64 },
    /// One or more dependency ids do not resolve to a task of the same owner
    #[error("Dependencies not found for this owner: {}", join_ids(.ids))]
    DependencyNotFound { ids: Vec<u64> },
    /// A task was asked to depend on itself
    #[error("Task {id} cannot depend on itself")]
    SelfDependency { id: u64 },
    /// The requested edge set would close a cycle
    #[error("Circular dependency: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },
    /// Status change blocked by incomplete prerequisites
    #[error("Task {task_id} is blocked by incomplete prerequisites: {}", .blocking.join(", "))]
    DependencyNotMet { task_id: u64, blocking: Vec<String> },
    /// Receipt for (template, date) already exists. Absorbed by the generator.
    #[error("Instance for template {template_id} on {date} was already generated")]
    DuplicateGeneration { template_id: u64, date: Date },
    /// The template already generated as many instances as it allows.
    /// Absorbed by the generator.
    #[error("Template {template_id} reached its limit of {limit} instances")]
    InstanceLimitReached { template_id: u64, limit: u32 },
    /// Isolated failure while processing a single template during a pass
    #[error("Template {template_id} failed during generation: {message}")]
    SchedulerTemplate { template_id: u64, message: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> TrackerError {
        TrackerError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> TrackerError {
        TrackerError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl TrackerError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Maps a `spawn_blocking` join failure into a configuration error.
    pub(crate) fn join(error: tokio::task::JoinError) -> Self {
        Self::Configuration {
            message: format!("Task join error: {error}"),
        }
    }

    /// Whether this error is a caller-facing validation or dependency error
    /// rather than an infrastructure failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::TaskNotFound { .. }
                | Self::TemplateNotFound { .. }
                | Self::DependencyNotFound { .. }
                | Self::SelfDependency { .. }
                | Self::CircularDependency { .. }
                | Self::DependencyNotMet { .. }
                | Self::InvalidInput { .. }
        )
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| TrackerError::database(message).with_source(e))
    }
}

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
