//! # Error Types
//!
//! Domain-specific error types for challenge-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  challenge-core errors (this file)                                     │
//! │  └── CoreError        - Encoding, status parsing, password hashing     │
//! │                                                                         │
//! │  challenge-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: CoreError → DbError → HTTP layer                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A parameter list could not be serialized for storage.
    #[error("Failed to encode test parameters: {0}")]
    ParamsEncoding(#[from] serde_json::Error),

    /// Stored answer status is not one the domain knows about.
    ///
    /// ## When This Occurs
    /// - A row was written by another tool with a free-form status
    #[error("Unknown answer status: '{0}'")]
    UnknownStatus(String),

    /// The password policy could not produce a storable value.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
