use std::path::PathBuf;
use thiserror::Error;

/// Database error types for SideQuests
#[derive(Error, Debug)]
pub enum DbError {
    /// Error establishing connection to the database
    #[error("Failed to connect to database at {path}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: Box<surrealdb::Error>,
    },

    /// Error during schema initialization
    #[error("Failed to initialize database schema: {0}")]
    Schema(#[source] Box<surrealdb::Error>),

    /// Error executing a query
    #[error("Query execution failed")]
    Query(#[source] Box<surrealdb::Error>),

    /// A multi-statement transaction failed and was rolled back
    #[error("Transaction failed and was rolled back: {0}")]
    Transaction(#[source] Box<surrealdb::Error>),

    /// Error creating database directory
    #[error("Failed to create database directory at {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error when a requested record was not found
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// The record exists but belongs to a different parent quest
    #[error("{kind} '{id}' does not belong to quest '{scope}'")]
    ScopeMismatch {
        kind: &'static str,
        id: String,
        scope: String,
    },

    /// Error for invalid input or validation failure
    #[error("{message}")]
    ValidationError { message: String },

    /// Every generated id candidate collided with an existing record
    #[error("Failed to generate a unique {kind} id after {attempts} attempts")]
    IdExhausted { kind: &'static str, attempts: usize },
}

/// Marker in the commit error SurrealKV raises when two transactions touch
/// the same keys
const CONFLICT_MARKER: &str = "read or write conflict";

/// Whether `err` is a commit conflict with a concurrent transaction
pub fn is_conflict(err: &surrealdb::Error) -> bool {
    err.to_string().contains(CONFLICT_MARKER)
}

impl From<surrealdb::Error> for DbError {
    fn from(err: surrealdb::Error) -> Self {
        if is_conflict(&err) {
            DbError::Transaction(Box::new(err))
        } else {
            DbError::Query(Box::new(err))
        }
    }
}

impl DbError {
    /// Shorthand for a validation failure with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        DbError::ValidationError {
            message: message.into(),
        }
    }

    /// Get the full error message including nested SurrealDB error details.
    ///
    /// This is useful for displaying detailed error information to users.
    pub fn full_message(&self) -> String {
        match self {
            DbError::Query(err) => format!("Query execution failed: {}", err),
            other => other.to_string(),
        }
    }
}

/// Result type alias for database operations
pub type DbResult<T> = Result<T, DbError>;
