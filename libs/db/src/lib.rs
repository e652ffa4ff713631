//! Database handle for the user registry.
//!
//! Wraps a sqlx `SqlitePool` and a SeaORM `DatabaseConnection` built on top of
//! the same pool. SQLite PRAGMAs are taken from a strict whitelist of DSN query
//! parameters (`wal`, `journal_mode`, `synchronous`, `busy_timeout`).
//!
//! # Example
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> db::Result<()> {
//!     use db::{ConnectOpts, DbHandle};
//!
//!     let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
//!     let _conn = db.sea();
//!     db.close().await;
//!     Ok(())
//! }
//! ```

pub mod sqlite;

use std::str::FromStr;
use std::time::Duration;

use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle and helpers.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unsupported DSN: {0}")]
    UnknownDsn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid SQLite PRAGMA '{key}': {message}")]
    InvalidSqlitePragma { key: String, message: String },
}

/// Connection pool options.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Minimum number of connections in the pool.
    pub min_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    /// Idle timeout before a connection is closed.
    pub idle_timeout: Option<Duration>,
    /// Maximum lifetime for a connection.
    pub max_lifetime: Option<Duration>,
    /// Busy timeout used when the DSN does not carry `busy_timeout`.
    pub sqlite_busy_timeout: Option<Duration>,
    /// For file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            max_lifetime: None,
            sqlite_busy_timeout: Some(Duration::from_millis(DEFAULT_SQLITE_BUSY_TIMEOUT_MS)),
            create_sqlite_dirs: true,
        }
    }
}

const DEFAULT_SQLITE_BUSY_TIMEOUT_MS: u64 = 5000;

/// Main handle.
#[derive(Debug)]
pub struct DbHandle {
    pool: SqlitePool,
    dsn: String,
    in_memory: bool,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let trimmed = dsn.trim();
        if !trimmed.starts_with("sqlite:") {
            return Err(DbError::UnknownDsn(dsn.to_string()));
        }

        let (clean_dsn, pairs) = sqlite::extract_sqlite_pragmas(trimmed);
        let in_memory = sqlite::is_memory_dsn(&clean_dsn);

        if !in_memory && opts.create_sqlite_dirs {
            sqlite::prepare_sqlite_path(&clean_dsn)?;
        }

        let pragmas = sqlite::Pragmas::from_pairs(&pairs)?;
        let mut connect = SqliteConnectOptions::from_str(&clean_dsn)?.create_if_missing(true);
        connect = pragmas.apply(connect, in_memory);
        if pragmas.busy_timeout_ms.is_none() && !in_memory {
            if let Some(t) = opts.sqlite_busy_timeout {
                connect = connect.busy_timeout(t);
            }
        }

        let pool = pool_options(&opts, in_memory)
            .connect_with(connect)
            .await?;
        let sea = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());

        tracing::debug!(dsn = %clean_dsn, in_memory, "SQLite pool ready");

        Ok(Self {
            pool,
            dsn: clean_dsn,
            in_memory,
            sea,
        })
    }

    /// Graceful pool close. (Dropping the pool also closes it; this just makes it explicit.)
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// DSN used for this connection, with PRAGMA parameters stripped.
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    pub fn is_memory(&self) -> bool {
        self.in_memory
    }

    pub fn sqlx_sqlite(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get SeaORM connection (clone; cheap handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }

    pub fn seaorm(&self) -> &DatabaseConnection {
        &self.sea
    }
}

// An in-memory SQLite database lives and dies with its connection, so the pool
// is pinned to one connection that is never recycled.
fn pool_options(opts: &ConnectOpts, in_memory: bool) -> SqlitePoolOptions {
    let mut o = SqlitePoolOptions::new();
    if let Some(t) = opts.acquire_timeout {
        o = o.acquire_timeout(t);
    }

    if in_memory {
        return o
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    if let Some(n) = opts.max_conns {
        o = o.max_connections(n);
    }
    if let Some(n) = opts.min_conns {
        o = o.min_connections(n);
    }
    o.idle_timeout(opts.idle_timeout)
        .max_lifetime(opts.max_lifetime)
}
