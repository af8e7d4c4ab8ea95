use anyhow::Result;
use log::{debug, warn};

use super::connection::{DbPool, get_connection, to_sql_id};
use super::models::{CandidateRow, CandidateSide};
use super::{games, kill_events, users};
use crate::domain::{EducationType, GameId, GroupName, PlayerId, PlayerProfile};
use crate::matching::{HistoryOracle, QueueCandidates, RecentPairs};

/// History oracle backed by the bot's SQLite database
#[derive(Clone)]
pub struct SqliteHistoryOracle {
    pool: DbPool,
}

impl SqliteHistoryOracle {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn load_side(&self, game: GameId, side: CandidateSide) -> Result<Vec<PlayerProfile>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = users::list_candidates(&mut conn, game, side)?;

        Ok(rows.into_iter().filter_map(profile_from_row).collect())
    }
}

/// Rows that cannot form a valid profile are skipped with a warning
fn profile_from_row(row: CandidateRow) -> Option<PlayerProfile> {
    let Ok(id) = PlayerId::try_from(row.tg_id) else {
        warn!("Skipping candidate with negative tg_id {}", row.tg_id);
        return None;
    };

    let profile = PlayerProfile {
        id,
        rating: row.rating.unwrap_or(crate::domain::DEFAULT_RATING),
        education_type: EducationType::parse(&row.education_type),
        course_number: row.course_number,
        group_name: row
            .group_name
            .as_deref()
            .map(GroupName::parse)
            .unwrap_or_default(),
    };

    match profile.normalized() {
        Ok(profile) => Some(profile),
        Err(e) => {
            warn!("Skipping candidate {}: {}", id, e);
            None
        }
    }
}

impl HistoryOracle for SqliteHistoryOracle {
    fn active_game(&self) -> Result<Option<GameId>> {
        let mut conn = get_connection(&self.pool)?;
        games::find_active_game(&mut conn)
    }

    fn is_pending_paired(&self, game: GameId, killer: PlayerId, victim: PlayerId) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let paired =
            kill_events::has_pending_pair(&mut conn, game, to_sql_id(killer)?, to_sql_id(victim)?)?;
        debug!("is_pending_paired(killer={}, victim={}) returned {}", killer, victim, paired);
        Ok(paired)
    }

    fn recent_pairs(&self, game: GameId, depth: u32) -> Result<RecentPairs> {
        if depth == 0 {
            return Ok(RecentPairs::new());
        }

        let mut conn = get_connection(&self.pool)?;
        let rows = kill_events::recent_resolved_pairs(&mut conn, game, depth)?;
        let pairs: RecentPairs = rows
            .into_iter()
            .filter_map(|(killer, victim)| {
                Some((PlayerId::try_from(killer).ok()?, PlayerId::try_from(victim).ok()?))
            })
            .collect();
        debug!("recent_pairs(game={}, depth={}) returned {} pair(s)", game, depth, pairs.len());
        Ok(pairs)
    }

    fn queue_candidates(&self, game: GameId) -> Result<QueueCandidates> {
        Ok(QueueCandidates {
            killers: self.load_side(game, CandidateSide::Killer)?,
            victims: self.load_side(game, CandidateSide::Victim)?,
        })
    }
}
