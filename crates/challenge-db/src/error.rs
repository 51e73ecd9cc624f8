//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Postgres / SQLite error (sqlx::Error)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HTTP layer maps NotFound → 404, UniqueViolation → 409,                │
//! │  InvalidCredentials → 401, everything else → 500                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate terminates the process on a failed query. A
//! missing row is an ordinary `DbError::NotFound` returned to the caller.

use challenge_core::CoreError;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Message shared by every failed login.
pub const INVALID_CREDENTIALS: &str = "nickname or password wrong";

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - No question is dated today
    /// - User id doesn't exist
    /// - Update targeted a missing row
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a question with an existing id
    /// - Signing up with a nickname that is taken
    /// - Scheduling a second question for the same date
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Answer references an unknown nickname or question
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Login failed. Deliberately does not say whether the nickname or
    /// the password was wrong.
    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Server unreachable or credentials rejected
    /// - Liveness check after connecting failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction could not be started or committed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    ///
    /// ## When This Occurs
    /// - A stored row cannot be decoded into a domain type
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether this error means the row simply wasn't there.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }

    /// Whether this error is a uniqueness conflict.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Constraint kind (same for Postgres and SQLite)
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();

                match db_err.kind() {
                    ErrorKind::UniqueViolation => DbError::duplicate(
                        db_err
                            .constraint()
                            .map(str::to_string)
                            .unwrap_or_else(|| unique_field_from_message(&msg)),
                        "unknown",
                    ),
                    ErrorKind::ForeignKeyViolation => {
                        DbError::ForeignKeyViolation { message: msg }
                    }
                    // SQLite without extended result codes reports these as plain constraint errors
                    _ if msg.contains("UNIQUE constraint failed") => {
                        DbError::duplicate(unique_field_from_message(&msg), "unknown")
                    }
                    _ if msg.contains("FOREIGN KEY constraint failed") => {
                        DbError::ForeignKeyViolation { message: msg }
                    }
                    _ => DbError::QueryFailed(msg),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        DbError::Internal(err.to_string())
    }
}

/// Pulls `<table>.<column>` out of "UNIQUE constraint failed: <table>.<column>".
fn unique_field_from_message(msg: &str) -> String {
    msg.split("UNIQUE constraint failed: ")
        .nth(1)
        .unwrap_or("unknown")
        .to_string()
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
