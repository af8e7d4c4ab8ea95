use std::time::Duration;
use tokio::time::sleep;

/// Exponential delay between delivery attempts
pub struct Backoff {
    initial: Duration,
    max: Duration,
    attempts: u32,
}

impl Backoff {
    pub fn new(initial_ms: u64, max_ms: u64) -> Self {
        let initial = Duration::from_millis(initial_ms);
        Self {
            initial,
            max: Duration::from_millis(max_ms).max(initial),
            attempts: 0,
        }
    }

    /// Sleeps before every attempt except the first
    pub async fn wait(&mut self) {
        if self.should_wait() {
            self.apply_delay().await;
        }
        self.increment();
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay applied before the next attempt: initial * 2^(retries so far), capped
    pub fn current_delay(&self) -> Duration {
        let retries = self.attempts.saturating_sub(1);
        let factor = 1u32.checked_shl(retries).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max)
    }

    fn should_wait(&self) -> bool {
        self.attempts > 0
    }

    async fn apply_delay(&self) {
        sleep(self.current_delay()).await;
    }

    fn increment(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }
}
