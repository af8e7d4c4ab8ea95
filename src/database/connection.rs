use std::time::Duration;

use anyhow::{Context, Result};
use r2d2_sqlite::SqliteConnectionManager;

use crate::domain::PlayerId;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConn = r2d2::PooledConnection<SqliteConnectionManager>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn create_pool(database_path: &str) -> Result<DbPool> {
    let manager = build_manager(database_path);
    build_pool(manager)
}

fn build_manager(path: &str) -> SqliteConnectionManager {
    SqliteConnectionManager::file(path).with_init(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", "ON")
    })
}

fn build_pool(manager: SqliteConnectionManager) -> Result<DbPool> {
    r2d2::Pool::builder()
        .build(manager)
        .context("Failed to create database connection pool")
}

pub fn get_connection(pool: &DbPool) -> Result<DbConn> {
    pool.get()
        .context("Failed to get database connection from pool")
}

/// Round-trips a trivial query to prove the database is reachable
pub fn ping(pool: &DbPool) -> Result<()> {
    let conn = get_connection(pool)?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .context("Database ping failed")
        .map(|_| ())
}

/// SQLite stores integers as i64; player ids are unsigned on our side
pub fn to_sql_id(id: PlayerId) -> Result<i64> {
    i64::try_from(id).with_context(|| format!("Player id {} does not fit the database", id))
}
