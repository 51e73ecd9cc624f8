//! # Database Configuration
//!
//! Connection settings for both backends.
//!
//! PostgreSQL settings are loaded from environment variables (after an
//! optional `.env` file) with fallback to defaults:
//!
//! | Variable                        | Default     |
//! |---------------------------------|-------------|
//! | `CHALLENGE_DB_HOST`             | `localhost` |
//! | `CHALLENGE_DB_PORT`             | `5432`      |
//! | `CHALLENGE_DB_USER`             | `postgres`  |
//! | `CHALLENGE_DB_PASSWORD`         | (empty)     |
//! | `CHALLENGE_DB_NAME`             | `challenge` |
//! | `CHALLENGE_DB_MAX_CONNECTIONS`  | `10`        |
//!
//! Transport encryption is always disabled (`sslmode=disable`).

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

// =============================================================================
// PostgreSQL
// =============================================================================

/// PostgreSQL connection and pool settings.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::from_env()?.max_connections(20);
/// let repo = PgRepository::connect(&config).await?;
/// ```
#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Database name.
    pub database: String,

    /// Maximum number of connections in the pool.
    /// Default: 10
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a free connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            database: "challenge".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }
}

impl DbConfig {
    /// Creates a configuration for the given server and database.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        DbConfig {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            ..DbConfig::default()
        }
    }

    /// Loads configuration from `CHALLENGE_DB_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development
        let _ = dotenvy::dotenv();

        let mut config = DbConfig::default();

        if let Ok(host) = env::var("CHALLENGE_DB_HOST") {
            config.host = host;
        }
        if let Ok(user) = env::var("CHALLENGE_DB_USER") {
            config.user = user;
        }
        if let Ok(password) = env::var("CHALLENGE_DB_PASSWORD") {
            config.password = password;
        }
        if let Ok(database) = env::var("CHALLENGE_DB_NAME") {
            config.database = database;
        }
        config.port = parse_var("CHALLENGE_DB_PORT", config.port)?;
        config.max_connections =
            parse_var("CHALLENGE_DB_MAX_CONNECTIONS", config.max_connections)?;

        Ok(config)
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Driver connect options.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Disable)
    }

    /// libpq-style description of the target with the password masked.
    pub fn redacted_dsn(&self) -> String {
        format!(
            "host={} port={} user={} password=*** dbname={} sslmode=disable",
            self.host, self.port, self.user, self.database
        )
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

// =============================================================================
// SQLite
// =============================================================================

/// SQLite database settings.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl SqliteConfig {
    /// Creates a configuration for a database file. The file is created if
    /// it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteConfig {
            database_path: path.into(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Creates an in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        SqliteConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}
