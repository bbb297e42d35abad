//! Handlers for the layout and theme registries referenced by pages.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use trellis_core::error::CoreError;
use trellis_db::models::layout::CreateLayout;
use trellis_db::models::theme::CreateTheme;
use trellis_db::repositories::{LayoutRepo, ThemeRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Layouts
// ---------------------------------------------------------------------------

/// GET /api/v1/layouts
pub async fn list_layouts(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let layouts = LayoutRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: layouts }))
}

/// POST /api/v1/layouts
pub async fn create_layout(
    State(state): State<AppState>,
    Json(input): Json<CreateLayout>,
) -> AppResult<impl IntoResponse> {
    if input.key.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Layout key must not be empty".into(),
        )));
    }
    let layout = LayoutRepo::create(&state.pool, &input).await?;

    tracing::info!(layout_id = layout.id, key = %layout.key, "Layout registered");

    Ok((StatusCode::CREATED, Json(DataResponse { data: layout })))
}

/// PUT /api/v1/layouts/{key}/active
///
/// Retiring a layout makes pages that reference it fall back to their
/// ancestors' layout.
pub async fn set_layout_active(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<SetActiveRequest>,
) -> AppResult<impl IntoResponse> {
    if !LayoutRepo::set_active(&state.pool, &key, input.is_active).await? {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown layout '{key}'"
        ))));
    }

    tracing::info!(key = %key, is_active = input.is_active, "Layout activity changed");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Themes
// ---------------------------------------------------------------------------

/// GET /api/v1/themes
pub async fn list_themes(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let themes = ThemeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: themes }))
}

/// POST /api/v1/themes
pub async fn create_theme(
    State(state): State<AppState>,
    Json(input): Json<CreateTheme>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Theme name must not be empty".into(),
        )));
    }
    let theme = ThemeRepo::create(&state.pool, &input).await?;

    tracing::info!(theme_id = theme.id, name = %theme.name, "Theme created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: theme })))
}
