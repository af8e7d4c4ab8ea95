use anyhow::{Context, Result};
use rusqlite::OptionalExtension;

use super::connection::DbConn;
use crate::domain::GameId;

/// The game that has not ended yet, if any
pub fn find_active_game(conn: &mut DbConn) -> Result<Option<GameId>> {
    let sql = "SELECT id FROM games WHERE end_date IS NULL ORDER BY id DESC LIMIT 1";

    conn.query_row(sql, [], |row| row.get(0))
        .optional()
        .context("Failed to query active game")
}
