use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::{error, info};

use crate::matching::{MatchingEngine, QueueCandidates, QueueSizes};

/// Loads pools from the game store with a bounded wait
#[derive(Clone)]
pub struct QueueService {
    engine: Arc<MatchingEngine>,
    reload_timeout: Duration,
}

impl QueueService {
    pub fn new(engine: Arc<MatchingEngine>, reload_timeout: Duration) -> Self {
        Self {
            engine,
            reload_timeout,
        }
    }

    /// Startup load: candidates are added to whatever is already queued
    pub async fn populate(&self) -> Result<QueueSizes> {
        info!("Initializing queues from the game database");
        let candidates = self.load_candidates().await?;
        let engine = Arc::clone(&self.engine);

        tokio::task::spawn_blocking(move || engine.populate(candidates))
            .await
            .context("Queue population task panicked")
    }

    /// Operator reset: both pools are cleared, then refilled if loading worked
    pub async fn reset(&self) -> Result<QueueSizes> {
        info!("Resetting queues");
        let candidates = self.load_candidates().await;
        let engine = Arc::clone(&self.engine);

        let sizes = tokio::task::spawn_blocking(move || engine.reset_with(candidates))
            .await
            .context("Queue reset task panicked")?;
        if let Err(e) = &sizes {
            error!("Queue reset failed, pools left empty: {:#}", e);
        }
        sizes
    }

    async fn load_candidates(&self) -> Result<QueueCandidates> {
        let engine = Arc::clone(&self.engine);
        let task = tokio::task::spawn_blocking(move || engine.load_candidates());

        match tokio::time::timeout(self.reload_timeout, task).await {
            Ok(joined) => joined.context("Candidate loading task panicked")?,
            Err(_) => bail!(
                "Loading queue candidates timed out after {:?}",
                self.reload_timeout
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchmakingSettings;
    use crate::domain::{EducationType, GameId, GroupName, PlayerId, PlayerProfile, Role};
    use crate::matching::testing::FakeOracle;
    use crate::matching::{HistoryOracle, RecentPairs};

    fn profile(id: u64) -> PlayerProfile {
        PlayerProfile::new(id, 1200, EducationType::Specialist, Some(4), GroupName::Development)
            .unwrap()
    }

    fn service(oracle: impl HistoryOracle + 'static) -> (QueueService, Arc<MatchingEngine>) {
        let engine = Arc::new(MatchingEngine::new(
            Arc::new(oracle),
            MatchmakingSettings::default(),
        ));
        (
            QueueService::new(Arc::clone(&engine), Duration::from_millis(200)),
            engine,
        )
    }

    /// Answers every question only after a long pause
    struct SlowOracle;

    impl HistoryOracle for SlowOracle {
        fn active_game(&self) -> Result<Option<GameId>> {
            std::thread::sleep(Duration::from_secs(2));
            Ok(Some(1))
        }

        fn is_pending_paired(&self, _: GameId, _: PlayerId, _: PlayerId) -> Result<bool> {
            Ok(false)
        }

        fn recent_pairs(&self, _: GameId, _: u32) -> Result<RecentPairs> {
            Ok(RecentPairs::new())
        }

        fn queue_candidates(&self, _: GameId) -> Result<QueueCandidates> {
            Ok(QueueCandidates::default())
        }
    }

    #[tokio::test]
    async fn test_populate_adds_candidates() {
        let oracle = FakeOracle::with_game(1).candidates(QueueCandidates {
            killers: vec![profile(1)],
            victims: vec![profile(2), profile(3)],
        });
        let (service, engine) = service(oracle);
        engine.enqueue(Role::Killer, profile(9)).unwrap();

        let sizes = service.populate().await.unwrap();

        assert_eq!(sizes, QueueSizes { killers: 2, victims: 2 });
    }

    #[tokio::test]
    async fn test_reset_timeout_leaves_pools_empty() {
        let (service, engine) = service(SlowOracle);
        engine.enqueue_both(profile(5)).unwrap();

        let err = service.reset().await.unwrap_err();

        assert!(err.to_string().contains("timed out"));
        assert_eq!(engine.sizes(), QueueSizes::default());
    }

    #[tokio::test]
    async fn test_reset_without_active_game_empties_pools() {
        let (service, engine) = service(FakeOracle::default());
        engine.enqueue_both(profile(5)).unwrap();

        let sizes = service.reset().await.unwrap();

        assert_eq!(sizes, QueueSizes::default());
    }
}
