use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use crate::domain::GameId;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONFIRMED: &str = "confirmed";

/// Whether a pending event exists for exactly this (killer, victim) pair,
/// both given as Telegram ids
pub fn has_pending_pair(
    conn: &mut DbConn,
    game_id: GameId,
    killer_tg_id: i64,
    victim_tg_id: i64,
) -> Result<bool> {
    let sql = "
        SELECT 1
        FROM kill_events ke
        JOIN users k ON k.id = ke.killer_user_id
        JOIN users v ON v.id = ke.victim_user_id
        WHERE ke.game_id = ?1
          AND k.tg_id = ?2
          AND v.tg_id = ?3
          AND ke.status = ?4
        LIMIT 1
    ";

    conn.query_row(
        sql,
        params![game_id, killer_tg_id, victim_tg_id, STATUS_PENDING],
        |row| row.get::<_, i64>(0),
    )
    .optional()
    .context("Failed to check pending pair")
    .map(|found| found.is_some())
}

/// (killer, victim) Telegram ids of the latest `depth` resolved events
pub fn recent_resolved_pairs(
    conn: &mut DbConn,
    game_id: GameId,
    depth: u32,
) -> Result<Vec<(i64, i64)>> {
    let sql = "
        SELECT k.tg_id, v.tg_id
        FROM kill_events ke
        JOIN users k ON k.id = ke.killer_user_id
        JOIN users v ON v.id = ke.victim_user_id
        WHERE ke.game_id = ?1 AND ke.status != ?2
        ORDER BY ke.created_at DESC, ke.id DESC
        LIMIT ?3
    ";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![game_id, STATUS_PENDING, depth], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list recent kill events")?;

    Ok(rows)
}
