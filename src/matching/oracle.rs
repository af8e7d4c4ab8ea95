use std::collections::HashSet;

use anyhow::Result;

use crate::domain::{GameId, PlayerId, PlayerProfile};

/// Profiles eligible for each pool of the active game
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueCandidates {
    pub killers: Vec<PlayerProfile>,
    pub victims: Vec<PlayerProfile>,
}

/// Ordered (killer, victim) pairs
pub type RecentPairs = HashSet<(PlayerId, PlayerId)>;

/// The questions the matching engine asks the game store.
///
/// Implementations report failures as errors; the engine decides how each
/// failure degrades.
pub trait HistoryOracle: Send + Sync {
    fn active_game(&self) -> Result<Option<GameId>>;

    /// A pending (unconfirmed) match exists for exactly this ordered pair
    fn is_pending_paired(&self, game: GameId, killer: PlayerId, victim: PlayerId) -> Result<bool>;

    /// Pairs of the latest `depth` resolved matches; empty when `depth` is 0
    fn recent_pairs(&self, game: GameId, depth: u32) -> Result<RecentPairs>;

    /// The ordered pair is among the latest `depth` resolved matches
    fn were_recently_paired(
        &self,
        game: GameId,
        killer: PlayerId,
        victim: PlayerId,
        depth: u32,
    ) -> Result<bool> {
        Ok(self.recent_pairs(game, depth)?.contains(&(killer, victim)))
    }

    fn queue_candidates(&self, game: GameId) -> Result<QueueCandidates>;
}
