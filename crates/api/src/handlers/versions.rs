//! Handlers for page versions: history, snapshots, widget editing, publish,
//! restore, and comparison.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use trellis_core::types::DbId;
use trellis_core::versioning::WidgetRecord;
use trellis_db::models::page_version::CreatePageVersion;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceWidgetsRequest {
    #[validate(length(max = 500))]
    pub widgets: Vec<WidgetRecord>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct DraftRequest {
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub a: DbId,
    pub b: DbId,
}

/// GET /api/v1/pages/{id}/versions
///
/// Newest first, with the current version, latest draft, and
/// unpublished-changes flag.
pub async fn list_versions(
    State(state): State<AppState>,
    Path(page_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    // Surfaces 404 for unknown pages instead of an empty history.
    state.engine.hierarchy.get_page(page_id).await?;
    let history = state.engine.versions.history(page_id).await?;
    Ok(Json(DataResponse { data: history }))
}

/// POST /api/v1/pages/{id}/versions
pub async fn create_version(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(page_id): Path<DbId>,
    body: Option<Json<CreatePageVersion>>,
) -> AppResult<impl IntoResponse> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let version = state
        .engine
        .versions
        .create_version(page_id, &input, user)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
}

/// GET /api/v1/versions/{id}
pub async fn get_version(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let version = state.engine.versions.get_version(id).await?;
    Ok(Json(DataResponse { data: version }))
}

/// PUT /api/v1/versions/{id}/widgets
///
/// Draft versions only. Widgets are validated against the widget types and
/// their configs merged over the type defaults.
pub async fn replace_widgets(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(id): Path<DbId>,
    Json(input): Json<ReplaceWidgetsRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let version = state
        .engine
        .versions
        .replace_draft_widgets(id, input.widgets, user)
        .await?;
    Ok(Json(DataResponse { data: version }))
}

/// POST /api/v1/versions/{id}/publish
pub async fn publish_version(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let version = state.engine.versions.publish(id, user).await?;
    Ok(Json(DataResponse { data: version }))
}

/// POST /api/v1/versions/{id}/restore
///
/// Returns the backup of the overwritten state alongside the restored page.
pub async fn restore_version(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.engine.versions.restore(id, user).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/versions/{id}/draft
pub async fn create_draft(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(id): Path<DbId>,
    body: Option<Json<DraftRequest>>,
) -> AppResult<impl IntoResponse> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    input.validate()?;
    let version = state
        .engine
        .versions
        .create_draft_from_published(id, input.description, user)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
}

/// GET /api/v1/versions/compare?a=..&b=..
///
/// `a` is the reference side: widgets only in `a` are reported as added.
pub async fn compare_versions(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> AppResult<impl IntoResponse> {
    let diff = state.engine.versions.compare(query.a, query.b).await?;
    Ok(Json(DataResponse { data: diff }))
}
