use anyhow::{Context, Result};
use rusqlite::params;

use super::connection::DbConn;
use super::kill_events::STATUS_CONFIRMED;
use super::models::{CandidateRow, CandidateSide};
use crate::domain::GameId;

/// In-game users with no kill event on the given side that is still open
/// (anything but confirmed) in this game
pub fn list_candidates(
    conn: &mut DbConn,
    game_id: GameId,
    side: CandidateSide,
) -> Result<Vec<CandidateRow>> {
    let sql = format!(
        "
        SELECT u.tg_id, p.rating, u.type, u.course_number, u.group_name
        FROM users u
        LEFT JOIN players p ON u.id = p.user_id AND p.game_id = ?1
        WHERE u.is_in_game = 1
          AND NOT EXISTS (
              SELECT 1 FROM kill_events k
              WHERE k.{} = u.id AND k.game_id = ?1 AND k.status != ?2
          )
        ",
        side.event_column()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![game_id, STATUS_CONFIRMED], parse_candidate_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list queue candidates")?;

    Ok(rows)
}

fn parse_candidate_row(row: &rusqlite::Row) -> rusqlite::Result<CandidateRow> {
    Ok(CandidateRow {
        tg_id: row.get(0)?,
        rating: row.get(1)?,
        education_type: row.get(2)?,
        course_number: row.get(3)?,
        group_name: row.get(4)?,
    })
}
