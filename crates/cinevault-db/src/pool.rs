//! Database connection pool management.
//!
//! This module provides connection pooling for SQLite using r2d2.
//! It handles pool initialization, running migrations, and the health report
//! served by `GET /health`.

use std::time::Duration;

use cinevault_common::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde::Serialize;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Connections kept by a file-backed pool.
const FILE_POOL_SIZE: u32 = 4;

/// Initialize a new database pool with the given file path.
///
/// This function will:
/// - Create the SQLite database file if it doesn't exist
/// - Put the database in WAL mode with a busy timeout, so streaming reads are
///   not blocked by an in-progress scan transaction
/// - Run pending database migrations
///
/// # Example
///
/// ```no_run
/// use cinevault_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/cinevault/catalog.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))
    });

    let pool = Pool::builder()
        .max_size(FILE_POOL_SIZE)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    migrate(&pool)?;
    Ok(pool)
}

/// Initialize an in-memory database pool for testing.
///
/// Every SQLite in-memory connection is its own database, so the pool holds a
/// single connection and all checkouts see the same data. The database is
/// lost when the pool is dropped.
///
/// # Example
///
/// ```
/// use cinevault_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory();

    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create in-memory pool: {}", e)))?;

    migrate(&pool)?;
    Ok(pool)
}

fn migrate(pool: &DbPool) -> Result<()> {
    let conn = get_conn(pool)?;
    migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;
    Ok(())
}

/// Get a connection from the pool.
///
/// Convenience wrapper around `pool.get()` that converts the r2d2 error into
/// the common Error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}

/// Store status reported by the health endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthReport {
    /// `"up"` when a round trip to the database succeeded, `"down"` otherwise.
    pub status: &'static str,
    pub message: String,
    /// Connections currently held by the pool.
    pub connections: u32,
    pub idle_connections: u32,
}

impl HealthReport {
    pub fn is_up(&self) -> bool {
        self.status == "up"
    }
}

/// Check that the store answers a trivial query.
pub fn health(pool: &DbPool) -> HealthReport {
    let state = pool.state();
    let probe = get_conn(pool).and_then(|conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| Error::database(e.to_string()))
    });

    let (status, message) = match probe {
        Ok(_) => ("up", "It's healthy".to_string()),
        Err(e) => ("down", e.to_string()),
    };

    HealthReport {
        status,
        message,
        connections: state.connections,
        idle_connections: state.idle_connections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_pool() {
        let pool = init_memory_pool().unwrap();
        assert_eq!(pool.max_size(), 1);
    }

    #[test]
    fn test_migrations_run_on_init() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='movies'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_file_pool_shares_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let pool = init_pool(path.to_str().unwrap()).unwrap();

        {
            let conn = get_conn(&pool).unwrap();
            conn.execute(
                "INSERT INTO movies (title, file_name, file_path, file_size, format, created_at, updated_at)
                 VALUES ('A', 'a.mkv', '/m/a.mkv', 1, '.mkv', 'now', 'now')",
                [],
            )
            .unwrap();
        }

        let conn1 = get_conn(&pool).unwrap();
        let conn2 = get_conn(&pool).unwrap();
        for conn in [&conn1, &conn2] {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn test_health_up() {
        let pool = init_memory_pool().unwrap();
        let report = health(&pool);
        assert!(report.is_up());
        assert_eq!(report.status, "up");
        assert!(report.connections >= 1);
    }
}
