use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{PlayerId, Role};
use crate::matching::QueueSizes;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub database: bool,
    pub queues: QueueSizes,
    pub dead_letters: usize,
}

#[derive(Serialize)]
pub struct EnqueueResponse {
    pub id: PlayerId,
    pub roles: Vec<Role>,
}

#[derive(Serialize)]
pub struct RedeliverResponse {
    pub resubmitted: usize,
}
