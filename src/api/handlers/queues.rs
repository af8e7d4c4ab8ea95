use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::AppState;
use crate::api::error::ApiResult;
use crate::api::models::EnqueueResponse;
use crate::domain::{PlayerId, PlayerProfile, Role};
use crate::matching::{PlayerQueueStatus, QueueSizes, QueueSnapshot};

type ProfileBody = Result<Json<PlayerProfile>, JsonRejection>;

pub async fn enqueue_killer(
    State(state): State<Arc<AppState>>,
    body: ProfileBody,
) -> ApiResult<(StatusCode, Json<EnqueueResponse>)> {
    enqueue(&state, body, Role::Killer)
}

pub async fn enqueue_victim(
    State(state): State<Arc<AppState>>,
    body: ProfileBody,
) -> ApiResult<(StatusCode, Json<EnqueueResponse>)> {
    enqueue(&state, body, Role::Victim)
}

pub async fn enqueue_both(
    State(state): State<Arc<AppState>>,
    body: ProfileBody,
) -> ApiResult<(StatusCode, Json<EnqueueResponse>)> {
    let Json(profile) = body?;
    let id = profile.id;
    state.engine.enqueue_both(profile)?;

    Ok((
        StatusCode::CREATED,
        Json(EnqueueResponse {
            id,
            roles: vec![Role::Killer, Role::Victim],
        }),
    ))
}

fn enqueue(
    state: &AppState,
    body: ProfileBody,
    role: Role,
) -> ApiResult<(StatusCode, Json<EnqueueResponse>)> {
    let Json(profile) = body?;
    let id = profile.id;
    state.engine.enqueue(role, profile)?;

    Ok((
        StatusCode::CREATED,
        Json(EnqueueResponse {
            id,
            roles: vec![role],
        }),
    ))
}

pub async fn list_queues(State(state): State<Arc<AppState>>) -> Json<QueueSnapshot> {
    Json(state.engine.snapshot())
}

pub async fn queue_sizes(State(state): State<Arc<AppState>>) -> Json<QueueSizes> {
    Json(state.engine.sizes())
}

pub async fn player_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PlayerId>,
) -> Json<PlayerQueueStatus> {
    Json(state.engine.player_status(id))
}
