use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Duration;

use super::schema::SCHEMA;

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy();
        let is_memory = path_str.trim().eq_ignore_ascii_case(MEMORY_DB_PATH);

        let manager = if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        };

        // Foreign keys are off by default in SQLite and every cascade rule in
        // the schema depends on them.
        let manager = manager.with_init(|conn| {
            conn.pragma_update(None, "foreign_keys", "ON")?;
            // journal_mode reports the resulting mode as a row
            conn.query_row("PRAGMA journal_mode = WAL", [], |_row| Ok(()))?;
            conn.busy_timeout(Duration::from_millis(2000))
        });

        // A :memory: manager opens a distinct database per connection, so the
        // pool must hand out a single shared one.
        let pool = if is_memory {
            Pool::builder()
                .max_size(1)
                .build(manager)
                .context("Failed to create in-memory connection pool")?
        } else {
            Pool::new(manager).context("Failed to create database connection pool")?
        };

        Ok(Self { pool })
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Initialize the database schema
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}
