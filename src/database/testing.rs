use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::params;

use super::connection::{DbConn, DbPool, create_pool, get_connection};
use super::setup;
use crate::domain::GameId;

pub fn insert_game(conn: &mut DbConn) -> Result<GameId> {
    conn.query_row("INSERT INTO games DEFAULT VALUES RETURNING id", [], |row| row.get(0))
        .context("Failed to insert game")
}

pub fn end_game(conn: &mut DbConn, game_id: GameId) -> Result<()> {
    conn.execute(
        "UPDATE games SET end_date = CURRENT_TIMESTAMP WHERE id = ?1",
        params![game_id],
    )
    .context("Failed to end game")
    .map(|_| ())
}

pub fn insert_user(
    conn: &mut DbConn,
    tg_id: i64,
    education_type: &str,
    course_number: Option<i32>,
    group_name: Option<&str>,
    is_in_game: bool,
) -> Result<i64> {
    let sql = "INSERT INTO users (tg_id, type, course_number, group_name, is_in_game) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id";

    conn.query_row(
        sql,
        params![tg_id, education_type, course_number, group_name, is_in_game],
        |row| row.get(0),
    )
    .context("Failed to insert user")
}

pub fn upsert_player_rating(
    conn: &mut DbConn,
    user_id: i64,
    game_id: GameId,
    rating: i32,
) -> Result<()> {
    let sql = "INSERT INTO players (user_id, game_id, rating) VALUES (?1, ?2, ?3) ON CONFLICT (user_id, game_id) DO UPDATE SET rating = excluded.rating";

    conn.execute(sql, params![user_id, game_id, rating])
        .context("Failed to upsert player rating")
        .map(|_| ())
}

pub fn insert_kill_event(
    conn: &mut DbConn,
    game_id: GameId,
    killer_user_id: i64,
    victim_user_id: i64,
    status: &str,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    let sql = "INSERT INTO kill_events (game_id, killer_user_id, victim_user_id, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id";

    conn.query_row(
        sql,
        params![game_id, killer_user_id, victim_user_id, status, created_at],
        |row| row.get(0),
    )
    .context("Failed to insert kill event")
}

/// Schema-initialised SQLite file removed on drop
pub struct TestDb {
    path: PathBuf,
    pub pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "killer_matchmaking_{}_{}.db",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        setup::apply_schema(&mut get_connection(&pool).unwrap()).unwrap();
        Self { path, pool }
    }

    pub fn conn(&self) -> DbConn {
        get_connection(&self.pool).unwrap()
    }

    pub fn game(&self) -> GameId {
        insert_game(&mut self.conn()).unwrap()
    }

    pub fn user(&self, tg_id: i64, education_type: &str, in_game: bool) -> i64 {
        insert_user(&mut self.conn(), tg_id, education_type, Some(2), Some("ИИ"), in_game).unwrap()
    }

    pub fn event(&self, game: GameId, killer: i64, victim: i64, status: &str, minutes_ago: i64) {
        let created_at = Utc::now() - Duration::minutes(minutes_ago);
        insert_kill_event(&mut self.conn(), game, killer, victim, status, created_at).unwrap();
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
