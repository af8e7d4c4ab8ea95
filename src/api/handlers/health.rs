use axum::{Json, extract::State};
use chrono::Utc;
use log::warn;
use std::sync::Arc;

use super::AppState;
use crate::api::models::{HealthResponse, MessageResponse};
use crate::database;

pub async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "ok".to_string(),
    })
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let pool = state.pool.clone();
    let database = match tokio::task::spawn_blocking(move || database::ping(&pool)).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("Health check: {:#}", e);
            false
        }
        Err(e) => {
            warn!("Health check task failed: {}", e);
            false
        }
    };

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        timestamp: Utc::now(),
        database,
        queues: state.engine.sizes(),
        dead_letters: state.dead_letters.len(),
    })
}
