//! # Database Migrations
//!
//! Embedded SQL migrations for both backends.
//!
//! ## How Migrations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Process                                  │
//! │                                                                         │
//! │  connect_postgres / connect_sqlite                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Check _sqlx_migrations table (create if missing)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Compare embedded migrations vs applied                                │
//! │       │                                                                 │
//! │       ├── 001_initial_schema.sql  (questions, users, answers)          │
//! │       └── 002_unique_question_date.sql  (one question per day)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Run pending migrations in order, record each one                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Add the same change to both `migrations/postgres/` and `migrations/sqlite/`
//! 2. Name format: `NNN_description.sql` (e.g., `003_add_answer_score.sql`)
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::{PgPool, SqlitePool};
use tracing::info;

use crate::error::DbResult;

/// Embedded PostgreSQL migrations.
static POSTGRES_MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/postgres");

/// Embedded SQLite migrations.
static SQLITE_MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending PostgreSQL migrations.
///
/// Idempotent: safe to run multiple times.
pub async fn run_postgres(pool: &PgPool) -> DbResult<()> {
    info!("Checking for pending migrations (postgres)");

    POSTGRES_MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Runs all pending SQLite migrations.
pub async fn run_sqlite(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations (sqlite)");

    SQLITE_MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for a PostgreSQL pool.
///
/// A database that was never migrated reports zero applied. Query errors
/// are returned, not counted as zero.
pub async fn postgres_status(pool: &PgPool) -> DbResult<(usize, usize)> {
    let total = POSTGRES_MIGRATOR.migrations.len();

    let tracked: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await?;
    if !tracked {
        return Ok((total, 0));
    }

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}

/// Returns `(total_migrations, applied_migrations)` for a SQLite pool.
pub async fn sqlite_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = SQLITE_MIGRATOR.migrations.len();

    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if tracked == 0 {
        return Ok((total, 0));
    }

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}
