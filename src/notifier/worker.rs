use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::Serialize;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::client::OrchestratorClient;
use crate::backoff::Backoff;
use crate::config::NotifierSettings;
use crate::domain::MatchedPair;

/// A pair the orchestrator never accepted
#[derive(Debug, Clone, Serialize)]
pub struct DeadLetter {
    pub pair: MatchedPair,
    pub attempts: u32,
    pub last_error: String,
    pub parked_at: DateTime<Utc>,
}

/// Pairs whose delivery gave up, kept until an operator redelivers them
#[derive(Clone, Default)]
pub struct DeadLetters {
    inner: Arc<Mutex<Vec<DeadLetter>>>,
}

impl DeadLetters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, letter: DeadLetter) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(letter);
    }

    pub fn list(&self) -> Vec<DeadLetter> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn drain(&self) -> Vec<DeadLetter> {
        std::mem::take(&mut *self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Handle used by the matching side to hand pairs over for delivery
#[derive(Clone)]
pub struct DeliveryQueue {
    sender: UnboundedSender<MatchedPair>,
}

impl DeliveryQueue {
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, UnboundedReceiver<MatchedPair>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Returns false once the worker has stopped
    pub fn submit(&self, pair: MatchedPair) -> bool {
        match self.sender.send(pair) {
            Ok(()) => true,
            Err(e) => {
                error!("Delivery worker stopped, dropping pair {:?}", e.0);
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
    max_attempts: u32,
}

impl From<&NotifierSettings> for RetryPolicy {
    fn from(settings: &NotifierSettings) -> Self {
        Self {
            initial_backoff_ms: settings.initial_backoff_ms,
            max_backoff_ms: settings.max_backoff_ms,
            max_attempts: settings.max_attempts,
        }
    }
}

impl RetryPolicy {
    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts > 0 && attempts >= self.max_attempts
    }
}

/// Delivers submitted pairs to the orchestrator, one retrying task per pair
pub struct DeliveryWorker {
    client: Arc<OrchestratorClient>,
    policy: RetryPolicy,
    dead_letters: DeadLetters,
    receiver: UnboundedReceiver<MatchedPair>,
}

pub fn delivery_channel(
    client: OrchestratorClient,
    settings: &NotifierSettings,
    dead_letters: DeadLetters,
) -> (DeliveryQueue, DeliveryWorker) {
    let (sender, receiver) = unbounded_channel();
    let worker = DeliveryWorker {
        client: Arc::new(client),
        policy: RetryPolicy::from(settings),
        dead_letters,
        receiver,
    };
    (DeliveryQueue { sender }, worker)
}

impl DeliveryWorker {
    /// Runs until every `DeliveryQueue` handle is dropped
    pub async fn run(mut self) {
        info!("Delivery worker started");
        while let Some(pair) = self.receiver.recv().await {
            let client = Arc::clone(&self.client);
            let dead_letters = self.dead_letters.clone();
            let policy = self.policy;
            tokio::spawn(async move {
                deliver(&client, pair, policy, &dead_letters).await;
            });
        }
        info!("Delivery worker stopped");
    }
}

/// Retries with exponential backoff; returns whether the pair was delivered
async fn deliver(
    client: &OrchestratorClient,
    pair: MatchedPair,
    policy: RetryPolicy,
    dead_letters: &DeadLetters,
) -> bool {
    let mut backoff = Backoff::new(policy.initial_backoff_ms, policy.max_backoff_ms);

    loop {
        backoff.wait().await;
        let attempt = backoff.attempts();

        let error = match client.notify(&pair).await {
            Ok(()) => {
                info!(
                    "Delivered match {} -> {} after {} attempt(s)",
                    pair.killer, pair.victim, attempt
                );
                return true;
            }
            Err(e) => e,
        };

        if policy.exhausted(attempt) {
            error!(
                "Giving up on match {} -> {} after {} attempts: {:#}",
                pair.killer, pair.victim, attempt, error
            );
            dead_letters.push(DeadLetter {
                pair,
                attempts: attempt,
                last_error: format!("{:#}", error),
                parked_at: Utc::now(),
            });
            return false;
        }

        warn!(
            "Delivery of {} -> {} failed (attempt {}), retrying in {:?}: {:#}",
            pair.killer,
            pair.victim,
            attempt,
            backoff.current_delay(),
            error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct BotState {
        hits: AtomicUsize,
        failures_before_success: usize,
        received: Mutex<Vec<(serde_json::Value, Option<String>)>>,
    }

    async fn match_endpoint(
        State(state): State<Arc<BotState>>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        let hit = state.hits.fetch_add(1, Ordering::SeqCst);
        let secret = headers
            .get("secret-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        state.received.lock().unwrap().push((body, secret));
        if hit < state.failures_before_success {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        }
    }

    async fn spawn_bot(failures_before_success: usize) -> (String, Arc<BotState>) {
        let state = Arc::new(BotState {
            failures_before_success,
            ..BotState::default()
        });
        let app = Router::new()
            .route("/match", post(match_endpoint))
            .with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), state)
    }

    fn settings(bot_url: String, max_attempts: u32) -> NotifierSettings {
        NotifierSettings {
            bot_url,
            secret_key: "s3cret".to_string(),
            timeout_secs: 5,
            initial_backoff_ms: 10,
            max_backoff_ms: 40,
            max_attempts,
            ..NotifierSettings::default()
        }
    }

    fn pair() -> MatchedPair {
        MatchedPair {
            killer: 11,
            victim: 22,
            quality: 0.8,
        }
    }

    #[tokio::test]
    async fn test_retries_until_orchestrator_accepts() {
        let (url, bot) = spawn_bot(2).await;
        let settings = settings(url, 0);
        let client = OrchestratorClient::new(&settings).unwrap();
        let dead_letters = DeadLetters::new();

        let delivered = deliver(&client, pair(), RetryPolicy::from(&settings), &dead_letters).await;

        assert!(delivered);
        assert_eq!(bot.hits.load(Ordering::SeqCst), 3);
        assert!(dead_letters.is_empty());
        let received = bot.received.lock().unwrap();
        let (body, secret) = &received[2];
        assert_eq!(body, &serde_json::json!({"killer": 11, "victim": 22, "quality": 0.8}));
        assert_eq!(secret.as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn test_exhausted_delivery_is_dead_lettered() {
        let (url, bot) = spawn_bot(usize::MAX).await;
        let settings = settings(url, 3);
        let client = OrchestratorClient::new(&settings).unwrap();
        let dead_letters = DeadLetters::new();

        let delivered = deliver(&client, pair(), RetryPolicy::from(&settings), &dead_letters).await;

        assert!(!delivered);
        assert_eq!(bot.hits.load(Ordering::SeqCst), 3);
        let letters = dead_letters.drain();
        assert_eq!(letters.len(), 1);
        assert_eq!(letters[0].attempts, 3);
        assert_eq!(letters[0].pair, pair());
        assert!(letters[0].last_error.contains("500"));
        assert!(dead_letters.is_empty());
    }

    #[tokio::test]
    async fn test_worker_delivers_submitted_pairs() {
        let (url, bot) = spawn_bot(0).await;
        let settings = settings(url, 0);
        let client = OrchestratorClient::new(&settings).unwrap();
        let (queue, worker) = delivery_channel(client, &settings, DeadLetters::new());
        let handle = tokio::spawn(worker.run());

        assert!(queue.submit(pair()));
        assert!(queue.submit(MatchedPair {
            killer: 33,
            victim: 44,
            quality: 0.7,
        }));

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while bot.hits.load(Ordering::SeqCst) < 2 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(bot.hits.load(Ordering::SeqCst), 2);

        drop(queue);
        handle.await.unwrap();
    }

    #[test]
    fn test_zero_max_attempts_never_exhausts() {
        let policy = RetryPolicy {
            initial_backoff_ms: 1,
            max_backoff_ms: 1,
            max_attempts: 0,
        };
        assert!(!policy.exhausted(u32::MAX));
        assert!(RetryPolicy { max_attempts: 2, ..policy }.exhausted(2));
    }
}
