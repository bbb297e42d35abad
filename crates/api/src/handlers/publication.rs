//! Handlers driving the publication state machine.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use trellis_core::publication::Schedule;
use trellis_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PublishNowRequest {
    /// Absent publishes immediately; future schedules; past unpublishes.
    pub effective_date: Option<Timestamp>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkPublishRequest {
    #[validate(length(min = 1, max = 500))]
    pub page_ids: Vec<DbId>,
    pub effective_date: Option<Timestamp>,
}

/// Outcome of a transition that may be refused without it being an error.
#[derive(Debug, Serialize)]
pub struct TransitionResult {
    pub page_id: DbId,
    pub changed: bool,
}

/// POST /api/v1/pages/{id}/publish
///
/// `changed` is false when the page is already published or cannot be
/// published from its current status.
pub async fn publish_page(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let changed = state.engine.publication.publish(id, user).await?;
    Ok(Json(DataResponse {
        data: TransitionResult {
            page_id: id,
            changed,
        },
    }))
}

/// POST /api/v1/pages/{id}/expire
pub async fn expire_page(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let changed = state.engine.publication.expire(id, user).await?;
    Ok(Json(DataResponse {
        data: TransitionResult {
            page_id: id,
            changed,
        },
    }))
}

/// POST /api/v1/pages/{id}/schedule
pub async fn schedule_page(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(id): Path<DbId>,
    Json(schedule): Json<Schedule>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .engine
        .publication
        .schedule(id, schedule, user)
        .await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/pages/{id}/unpublish
pub async fn unpublish_page(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let page = state.engine.publication.unpublish(id, user).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/pages/{id}/publish-now
///
/// An empty body publishes immediately.
pub async fn publish_now(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(id): Path<DbId>,
    body: Option<Json<PublishNowRequest>>,
) -> AppResult<impl IntoResponse> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let result = state
        .engine
        .publication
        .publish_with_date(id, input.effective_date, user)
        .await?;
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/pages/bulk-publish
///
/// Each page is handled in its own transaction; failures are reported per
/// page and do not fail the request.
pub async fn bulk_publish(
    State(state): State<AppState>,
    Actor(user): Actor,
    Json(input): Json<BulkPublishRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let report = state
        .engine
        .publication
        .publish_bulk(&input.page_ids, input.effective_date, user)
        .await;
    Ok(Json(DataResponse { data: report }))
}
