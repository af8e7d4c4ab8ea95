use crate::config::AppConfig;
use crate::database::DbPool;
use crate::matching::MatchingEngine;
use crate::notifier::{DeadLetters, DeliveryQueue};
use crate::services::queues::QueueService;
use std::sync::Arc;

pub mod admin;
pub mod health;
pub mod queues;

pub struct AppState {
    pub engine: Arc<MatchingEngine>,
    pub pool: DbPool,
    pub config: AppConfig,
    pub queues: QueueService,
    pub deliveries: DeliveryQueue,
    pub dead_letters: DeadLetters,
}
