use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};

use super::oracle::{HistoryOracle, QueueCandidates, RecentPairs};
use crate::domain::{GameId, PlayerId};

/// In-memory oracle with switchable failures
#[derive(Default)]
pub struct FakeOracle {
    pub game: Option<GameId>,
    pub pending: HashSet<(PlayerId, PlayerId)>,
    pub recent: RecentPairs,
    pub candidates: QueueCandidates,
    pub fail_active_game: bool,
    pub fail_history: bool,
    pub fail_candidates: bool,
    pub active_game_calls: AtomicUsize,
    pub recent_pairs_calls: AtomicUsize,
}

impl FakeOracle {
    pub fn with_game(game: GameId) -> Self {
        Self {
            game: Some(game),
            ..Self::default()
        }
    }

    pub fn pending(mut self, killer: PlayerId, victim: PlayerId) -> Self {
        self.pending.insert((killer, victim));
        self
    }

    pub fn recent(mut self, killer: PlayerId, victim: PlayerId) -> Self {
        self.recent.insert((killer, victim));
        self
    }

    pub fn candidates(mut self, candidates: QueueCandidates) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn failing_active_game(mut self) -> Self {
        self.fail_active_game = true;
        self
    }

    pub fn failing_history(mut self) -> Self {
        self.fail_history = true;
        self
    }

    pub fn failing_candidates(mut self) -> Self {
        self.fail_candidates = true;
        self
    }
}

impl HistoryOracle for FakeOracle {
    fn active_game(&self) -> Result<Option<GameId>> {
        self.active_game_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_active_game {
            bail!("database is locked");
        }
        Ok(self.game)
    }

    fn is_pending_paired(&self, _game: GameId, killer: PlayerId, victim: PlayerId) -> Result<bool> {
        if self.fail_history {
            bail!("database is locked");
        }
        Ok(self.pending.contains(&(killer, victim)))
    }

    fn recent_pairs(&self, _game: GameId, depth: u32) -> Result<RecentPairs> {
        self.recent_pairs_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_history {
            bail!("database is locked");
        }
        if depth == 0 {
            return Ok(RecentPairs::new());
        }
        Ok(self.recent.clone())
    }

    fn queue_candidates(&self, _game: GameId) -> Result<QueueCandidates> {
        if self.fail_candidates {
            bail!("database is locked");
        }
        Ok(self.candidates.clone())
    }
}
