use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info, trace, warn};
use serde::Serialize;

use super::oracle::{HistoryOracle, QueueCandidates, RecentPairs};
use super::pool::Pool;
use super::scoring::rate_player_pair;
use crate::config::MatchmakingSettings;
use crate::domain::{GameId, MatchedPair, PlayerId, PlayerProfile, ProfileError, QueueEntry, Role};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueSizes {
    pub killers: usize,
    pub victims: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueSnapshot {
    pub killers: Vec<QueueEntry>,
    pub victims: Vec<QueueEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerQueueStatus {
    pub id: PlayerId,
    pub queued_killer: bool,
    pub killer: Option<QueueEntry>,
    pub queued_victim: bool,
    pub victim: Option<QueueEntry>,
}

/// Killer -> victim chosen in a recent cycle
type ChosenVictims = HashMap<PlayerId, PlayerId>;

struct PoolGuards<'a> {
    killers: MutexGuard<'a, Pool>,
    victims: MutexGuard<'a, Pool>,
}

impl PoolGuards<'_> {
    fn pool_mut(&mut self, role: Role) -> &mut Pool {
        match role {
            Role::Killer => &mut *self.killers,
            Role::Victim => &mut *self.victims,
        }
    }

    fn sizes(&self) -> QueueSizes {
        QueueSizes {
            killers: self.killers.len(),
            victims: self.victims.len(),
        }
    }
}

/// Pools hold plain data, so a poisoned lock is still usable
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the killer pool, the victim pool and the anti-cycle memory.
///
/// Every operation takes the locks in the same order (killers, victims,
/// chosen victims), so callers cannot deadlock against a running cycle.
pub struct MatchingEngine {
    killers: Mutex<Pool>,
    victims: Mutex<Pool>,
    chosen_victims: Mutex<ChosenVictims>,
    oracle: Arc<dyn HistoryOracle>,
    settings: MatchmakingSettings,
}

impl MatchingEngine {
    pub fn new(oracle: Arc<dyn HistoryOracle>, settings: MatchmakingSettings) -> Self {
        Self {
            killers: Mutex::new(Pool::new()),
            victims: Mutex::new(Pool::new()),
            chosen_victims: Mutex::new(ChosenVictims::new()),
            oracle,
            settings,
        }
    }

    pub fn settings(&self) -> &MatchmakingSettings {
        &self.settings
    }

    fn lock_pools(&self) -> PoolGuards<'_> {
        let killers = lock(&self.killers);
        let victims = lock(&self.victims);
        PoolGuards { killers, victims }
    }

    pub fn enqueue(&self, role: Role, profile: PlayerProfile) -> Result<(), ProfileError> {
        let profile = profile.normalized()?;
        let mut pools = self.lock_pools();
        let id = profile.id;
        let replaced = pools.pool_mut(role).upsert(profile, Utc::now()).is_some();
        debug!("Player {} added to {} queue (replaced: {})", id, role, replaced);
        Ok(())
    }

    /// Queues the player for both roles under a single lock acquisition
    pub fn enqueue_both(&self, profile: PlayerProfile) -> Result<(), ProfileError> {
        let profile = profile.normalized()?;
        let mut pools = self.lock_pools();
        let now = Utc::now();
        let id = profile.id;
        pools.killers.upsert(profile.clone(), now);
        pools.victims.upsert(profile, now);
        debug!("Player {} added to both queues", id);
        Ok(())
    }

    pub fn remove(&self, role: Role, id: PlayerId) -> bool {
        let mut pools = self.lock_pools();
        pools.pool_mut(role).remove(id).is_some()
    }

    pub fn sizes(&self) -> QueueSizes {
        self.lock_pools().sizes()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let pools = self.lock_pools();
        QueueSnapshot {
            killers: pools.killers.entries(),
            victims: pools.victims.entries(),
        }
    }

    pub fn player_status(&self, id: PlayerId) -> PlayerQueueStatus {
        let pools = self.lock_pools();
        let killer = pools.killers.get(id).cloned();
        let victim = pools.victims.get(id).cloned();
        PlayerQueueStatus {
            id,
            queued_killer: killer.is_some(),
            killer,
            queued_victim: victim.is_some(),
            victim,
        }
    }

    /// Asks the oracle who should be queued for the active game.
    /// No active game yields empty candidates.
    pub fn load_candidates(&self) -> Result<QueueCandidates> {
        match self.oracle.active_game()? {
            Some(game) => self.oracle.queue_candidates(game),
            None => {
                info!("No active game, nothing to load into the queues");
                Ok(QueueCandidates::default())
            }
        }
    }

    /// Adds candidates to the pools without clearing them (startup)
    pub fn populate(&self, candidates: QueueCandidates) -> QueueSizes {
        let mut pools = self.lock_pools();
        Self::fill(&mut pools, candidates);
        let sizes = pools.sizes();
        info!(
            "Queue initialization complete: {} killers, {} victims",
            sizes.killers, sizes.victims
        );
        sizes
    }

    /// Clears both pools and refills them from `candidates` atomically.
    /// On failure the pools stay empty and the error is returned.
    pub fn reset_with(&self, candidates: Result<QueueCandidates>) -> Result<QueueSizes> {
        let mut pools = self.lock_pools();
        pools.killers.clear();
        pools.victims.clear();

        let candidates = candidates?;
        Self::fill(&mut pools, candidates);
        let sizes = pools.sizes();
        info!("Queues reloaded: {} killers, {} victims", sizes.killers, sizes.victims);
        Ok(sizes)
    }

    fn fill(pools: &mut PoolGuards<'_>, candidates: QueueCandidates) {
        let now = Utc::now();
        for profile in candidates.killers {
            pools.killers.upsert(profile, now);
        }
        for profile in candidates.victims {
            pools.victims.upsert(profile, now);
        }
    }

    /// Forgets every remembered killer -> victim choice
    pub fn sweep_chosen_victims(&self) -> usize {
        let mut chosen = lock(&self.chosen_victims);
        let cleared = chosen.len();
        chosen.clear();
        cleared
    }

    #[cfg(test)]
    pub(crate) fn chosen_victim(&self, killer: PlayerId) -> Option<PlayerId> {
        lock(&self.chosen_victims).get(&killer).copied()
    }

    /// One greedy matching pass. Matched players leave their pools before
    /// this returns; delivering the pairs is the caller's job.
    pub fn run_cycle(&self) -> Vec<MatchedPair> {
        let mut pools = self.lock_pools();
        let mut chosen = lock(&self.chosen_victims);

        if pools.killers.len() + pools.victims.len() < 2 {
            return Vec::new();
        }

        let Some(game) = self.active_game() else {
            debug!("No active game, skipping matching cycle");
            return Vec::new();
        };

        let now = Utc::now();
        debug!("Running matching cycle at {}", now);

        let cycle = Cycle {
            engine: self,
            game,
            now,
            recent: self.recent_pairs(game),
        };
        cycle.pair_players(&mut pools.killers, &mut pools.victims, &mut chosen)
    }

    fn active_game(&self) -> Option<GameId> {
        match self.oracle.active_game() {
            Ok(game) => game,
            Err(e) => {
                warn!("Active game lookup failed, treating as no game: {:#}", e);
                None
            }
        }
    }

    fn is_pending(&self, game: GameId, killer: PlayerId, victim: PlayerId) -> bool {
        match self.oracle.is_pending_paired(game, killer, victim) {
            Ok(pending) => pending,
            Err(e) => {
                warn!(
                    "Pending check for {} -> {} failed, not excluding: {:#}",
                    killer, victim, e
                );
                false
            }
        }
    }

    /// Loaded once per cycle; a failed lookup excludes nothing
    fn recent_pairs(&self, game: GameId) -> RecentPairs {
        match self.oracle.recent_pairs(game, self.settings.history_depth) {
            Ok(recent) => recent,
            Err(e) => {
                warn!("Match history lookup failed, not excluding recent pairs: {:#}", e);
                RecentPairs::new()
            }
        }
    }
}

/// State fixed for the duration of one matching pass
struct Cycle<'a> {
    engine: &'a MatchingEngine,
    game: GameId,
    now: DateTime<Utc>,
    recent: RecentPairs,
}

impl Cycle<'_> {
    fn pair_players(
        &self,
        killers: &mut Pool,
        victims: &mut Pool,
        chosen: &mut ChosenVictims,
    ) -> Vec<MatchedPair> {
        let mut processed_killers = HashSet::new();
        let mut processed_victims = HashSet::new();
        let mut pairs = Vec::new();

        for killer_id in killers.ids() {
            if processed_killers.contains(&killer_id) {
                continue;
            }
            if self.engine.settings.single_role_per_cycle && processed_victims.contains(&killer_id) {
                continue;
            }
            let Some(killer) = killers.get(killer_id).cloned() else {
                continue;
            };

            let Some((victim_id, quality)) =
                self.best_victim(&killer, victims, &processed_victims, chosen)
            else {
                continue;
            };

            processed_killers.insert(killer_id);
            processed_victims.insert(victim_id);
            chosen.insert(killer_id, victim_id);
            killers.remove(killer_id);
            victims.remove(victim_id);

            info!(
                "Matched killer {} with victim {} (quality {:.3})",
                killer_id, victim_id, quality
            );
            pairs.push(MatchedPair {
                killer: killer_id,
                victim: victim_id,
                quality,
            });
        }

        pairs
    }

    /// Highest-quality eligible victim; the first victim reaching a new
    /// maximum wins ties.
    fn best_victim(
        &self,
        killer: &QueueEntry,
        victims: &Pool,
        processed_victims: &HashSet<PlayerId>,
        chosen: &ChosenVictims,
    ) -> Option<(PlayerId, f64)> {
        let settings = &self.engine.settings;
        let mut best_quality = 0.0;
        let mut best_victim = None;

        for victim in victims.iter() {
            let victim_id = victim.id();
            if self.is_excluded(killer.id(), victim_id, processed_victims, chosen) {
                continue;
            }

            let quality = rate_player_pair(killer, victim, self.now, &settings.scoring);
            trace!("rate_player_pair({}, {}) = {}", killer.id(), victim_id, quality);
            if quality < settings.quality_threshold {
                continue;
            }
            if quality > best_quality {
                best_quality = quality;
                best_victim = Some(victim_id);
            }
        }

        best_victim.map(|id| (id, best_quality))
    }

    fn is_excluded(
        &self,
        killer_id: PlayerId,
        victim_id: PlayerId,
        processed_victims: &HashSet<PlayerId>,
        chosen: &ChosenVictims,
    ) -> bool {
        if killer_id == victim_id || processed_victims.contains(&victim_id) {
            return true;
        }
        // the victim targeted this killer recently: pairing back would close a loop
        if chosen.get(&victim_id) == Some(&killer_id) {
            return true;
        }

        if self.recent.contains(&(killer_id, victim_id)) {
            return true;
        }

        let engine = self.engine;
        engine.is_pending(self.game, victim_id, killer_id)
            || engine.is_pending(self.game, killer_id, victim_id)
    }
}
