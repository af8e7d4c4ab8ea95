use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info};
use tokio::time::{MissedTickBehavior, interval};

use crate::matching::MatchingEngine;
use crate::notifier::DeliveryQueue;

/// Drives periodic matching cycles and the anti-cycle sweep
pub struct Scheduler {
    engine: Arc<MatchingEngine>,
    deliveries: DeliveryQueue,
    period: Duration,
    sweep_every_ticks: u64,
}

impl Scheduler {
    pub fn new(engine: Arc<MatchingEngine>, deliveries: DeliveryQueue) -> Self {
        let settings = engine.settings();
        let period = Duration::from_secs(settings.interval_secs.max(1));
        let sweep_every_ticks = settings.sweep_every_ticks;

        Self {
            engine,
            deliveries,
            period,
            sweep_every_ticks,
        }
    }

    /// Ticks forever. Cycles are not awaited, so a slow one never delays the
    /// next tick; overlapping cycles serialize on the engine's locks.
    pub async fn run(self) {
        info!(
            "Scheduler started: cycle every {:?}, sweep every {} ticks",
            self.period, self.sweep_every_ticks
        );
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // the first tick completes immediately
        ticker.tick().await;

        let mut ticks: u64 = 0;
        loop {
            ticker.tick().await;
            ticks = ticks.wrapping_add(1);

            let engine = Arc::clone(&self.engine);
            let deliveries = self.deliveries.clone();
            tokio::spawn(async move {
                if let Err(e) = run_cycle(engine, deliveries).await {
                    error!("Matching cycle failed: {:#}", e);
                }
            });

            if self.is_sweep_tick(ticks) {
                let engine = Arc::clone(&self.engine);
                tokio::spawn(async move {
                    if let Err(e) = sweep(engine).await {
                        error!("Chosen victim sweep failed: {:#}", e);
                    }
                });
            }
        }
    }

    fn is_sweep_tick(&self, ticks: u64) -> bool {
        self.sweep_every_ticks > 0 && ticks % self.sweep_every_ticks == 0
    }
}

/// Runs one cycle off the async threads and hands its pairs to delivery
pub async fn run_cycle(engine: Arc<MatchingEngine>, deliveries: DeliveryQueue) -> Result<usize> {
    let pairs = tokio::task::spawn_blocking(move || engine.run_cycle())
        .await
        .context("Matching cycle task panicked")?;

    if !pairs.is_empty() {
        debug!("Cycle produced {} pair(s)", pairs.len());
    }
    let count = pairs.len();
    for pair in pairs {
        deliveries.submit(pair);
    }
    Ok(count)
}

pub async fn sweep(engine: Arc<MatchingEngine>) -> Result<usize> {
    let cleared = tokio::task::spawn_blocking(move || engine.sweep_chosen_victims())
        .await
        .context("Sweep task panicked")?;
    info!("Cleared {} remembered victim choice(s)", cleared);
    Ok(cleared)
}
