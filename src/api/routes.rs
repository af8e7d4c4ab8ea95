use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{
    AppState,
    admin::{list_dead_letters, redeliver_dead_letters, reset_queues},
    health::{health, ping},
    queues::{enqueue_both, enqueue_killer, enqueue_victim, list_queues, player_status, queue_sizes},
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health))
        .route("/queues", get(list_queues))
        .route("/queues/len", get(queue_sizes))
        .route("/queues/killers", post(enqueue_killer))
        .route("/queues/victims", post(enqueue_victim))
        .route("/queues/both", post(enqueue_both))
        .route("/queues/player/:id", get(player_status))
        .route("/admin/reset", post(reset_queues))
        .route("/admin/dead-letters", get(list_dead_letters))
        .route("/admin/dead-letters/redeliver", post(redeliver_dead_letters))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
