//! # challenge-db: Database Layer for Daily Challenge
//!
//! Data access for questions, users and answers. PostgreSQL in production,
//! SQLite for local runs and tests, one contract for both.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Daily Challenge Data Flow                          │
//! │                                                                         │
//! │  HTTP handler (GET /question, POST /login, POST /answer ...)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   challenge-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │    config     │    │    repository      │  │ migrations │  │   │
//! │  │   │   + pool      │    │                    │  │ (embedded) │  │   │
//! │  │   │               │    │ ChallengeRepository│  │            │  │   │
//! │  │   │ DbConfig      │◄───│  ├ PgRepository    │  │ postgres/  │  │   │
//! │  │   │ SqliteConfig  │    │  └ SqliteRepository│  │ sqlite/    │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  questions │ users │ answers                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Connection settings, loaded from the environment
//! - [`pool`] - Pool creation with liveness check
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - The repository trait and both backends
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use challenge_db::{ChallengeRepository, DbConfig, PgRepository};
//!
//! let repo: Arc<dyn ChallengeRepository> =
//!     Arc::new(PgRepository::connect(&DbConfig::from_env()?).await?);
//!
//! match repo.read_question().await {
//!     Ok(question) => { /* serve it */ }
//!     Err(e) if e.is_not_found() => { /* nothing scheduled today */ }
//!     Err(e) => return Err(e.into()),
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig, SqliteConfig};
pub use error::{DbError, DbResult};
pub use pool::{connect_postgres, connect_sqlite};

pub use repository::{ChallengeRepository, PgRepository, SqliteRepository};
