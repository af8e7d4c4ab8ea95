use axum::{Json, extract::State, http::HeaderMap};
use log::info;
use std::sync::Arc;

use super::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::api::models::RedeliverResponse;
use crate::http::SECRET_HEADER;
use crate::matching::QueueSizes;
use crate::notifier::DeadLetter;

/// An empty configured secret leaves the admin routes open
fn authorize(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let expected = &state.config.notifier.secret_key;
    if expected.is_empty() {
        return Ok(());
    }

    let provided = headers.get(SECRET_HEADER).and_then(|h| h.to_str().ok());
    if provided != Some(expected.as_str()) {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

pub async fn reset_queues(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<QueueSizes>> {
    authorize(&state, &headers)?;
    info!("Admin triggered queue reset");

    let sizes = state.queues.reset().await?;
    Ok(Json(sizes))
}

pub async fn list_dead_letters(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<DeadLetter>>> {
    authorize(&state, &headers)?;
    Ok(Json(state.dead_letters.list()))
}

pub async fn redeliver_dead_letters(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<RedeliverResponse>> {
    authorize(&state, &headers)?;

    let letters = state.dead_letters.drain();
    let mut resubmitted = 0;
    for letter in letters {
        if state.deliveries.submit(letter.pair) {
            resubmitted += 1;
        } else {
            state.dead_letters.push(letter);
        }
    }
    info!("Admin resubmitted {} dead letter(s)", resubmitted);

    Ok(Json(RedeliverResponse { resubmitted }))
}
