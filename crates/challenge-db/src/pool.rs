//! # Database Pool Management
//!
//! Connection pool creation for PostgreSQL and SQLite.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  DbConfig::from_env() ← host, port, user, password, dbname             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  connect_postgres(&config) ← Create pool                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT 1 ← Liveness check, fail fast with ConnectionFailed            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Run migrations (if enabled)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PgRepository { pool } ← Owned by the repository, cloned cheaply       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::str::FromStr;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{PgPool, SqlitePool};
use tracing::{debug, info};

use crate::config::{DbConfig, SqliteConfig};
use crate::error::{DbError, DbResult};
use crate::migrations;

/// Creates a PostgreSQL pool, verifies it answers, and runs migrations.
///
/// ## Returns
/// * `Ok(PgPool)` - Ready-to-use pool
/// * `Err(DbError::ConnectionFailed)` - Server unreachable or liveness check failed
/// * `Err(DbError::MigrationFailed)` - Schema could not be brought up to date
pub async fn connect_postgres(config: &DbConfig) -> DbResult<PgPool> {
    info!(target_db = %config.redacted_dsn(), "Initializing database connection");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .connect_with(config.connect_options())
        .await
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

    // Liveness check, fail fast before handing the pool out
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

    info!(
        max_connections = config.max_connections,
        "Database pool created"
    );

    if config.run_migrations {
        migrations::run_postgres(&pool).await?;
    }

    Ok(pool)
}

/// Creates a SQLite pool, verifies it answers, and runs migrations.
///
/// File databases use WAL with NORMAL synchronous. In-memory databases
/// keep their single connection open for the life of the pool, since the
/// data disappears with it.
pub async fn connect_sqlite(config: &SqliteConfig) -> DbResult<SqlitePool> {
    info!(
        path = %config.database_path.display(),
        "Initializing database connection"
    );

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout);

    let connect_options = if config.is_in_memory() {
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);

        SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
    } else {
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true)
    };

    // Off by default in SQLite; answers rely on cascades
    let connect_options = connect_options.foreign_keys(true);

    debug!("Connection options configured");

    let pool = pool_options
        .connect_with(connect_options)
        .await
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

    // Liveness check, fail fast before handing the pool out
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

    info!(
        max_connections = config.max_connections,
        "Database pool created"
    );

    if config.run_migrations {
        migrations::run_sqlite(&pool).await?;
    }

    Ok(pool)
}

// =============================================================================
// Unit Tests
// =============================================================================
