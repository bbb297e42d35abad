//! Handlers for the page tree: CRUD, hierarchy moves, hostname claims, and
//! navigation helpers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use trellis_core::hierarchy::Breadcrumb;
use trellis_core::types::{DbId, Timestamp};
use trellis_db::models::page::{CreatePage, UpdatePage};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePageRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    pub parent_id: Option<DbId>,
    pub sort_order: Option<i32>,
    pub layout_key: Option<String>,
    pub theme_id: Option<DbId>,
    #[validate(length(max = 50))]
    pub hostnames: Option<Vec<String>>,
    pub effective_date: Option<Timestamp>,
    pub expiry_date: Option<Timestamp>,
    #[validate(length(max = 255))]
    pub seo_title: Option<String>,
    #[validate(length(max = 1000))]
    pub meta_description: Option<String>,
    pub show_in_menus: Option<bool>,
}

impl From<CreatePageRequest> for CreatePage {
    fn from(req: CreatePageRequest) -> Self {
        CreatePage {
            title: req.title,
            slug: req.slug,
            parent_id: req.parent_id,
            sort_order: req.sort_order,
            layout_key: req.layout_key,
            theme_id: req.theme_id,
            hostnames: req.hostnames,
            effective_date: req.effective_date,
            expiry_date: req.expiry_date,
            seo_title: req.seo_title,
            meta_description: req.meta_description,
            show_in_menus: req.show_in_menus,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetParentRequest {
    pub parent_id: Option<DbId>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddHostnameRequest {
    #[validate(length(min = 1, max = 255))]
    pub hostname: String,
}

#[derive(Debug, Serialize)]
pub struct Navigation {
    pub url: String,
    pub breadcrumbs: Vec<Breadcrumb>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/pages
pub async fn create_page(
    State(state): State<AppState>,
    Actor(user): Actor,
    Json(input): Json<CreatePageRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let page = state
        .engine
        .hierarchy
        .create_page(&CreatePage::from(input), user)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: page })))
}

/// GET /api/v1/pages/{id}
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let page = state.engine.hierarchy.get_page(id).await?;
    Ok(Json(DataResponse { data: page }))
}

/// PUT /api/v1/pages/{id}
///
/// Partial update. Nullable fields are cleared with an explicit `null`.
pub async fn update_page(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(id): Path<DbId>,
    Json(patch): Json<UpdatePage>,
) -> AppResult<impl IntoResponse> {
    let page = state.engine.hierarchy.update_page(id, &patch, user).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/pages/{id}/children
pub async fn list_children(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let children = state.engine.hierarchy.children(id).await?;
    Ok(Json(DataResponse { data: children }))
}

/// PUT /api/v1/pages/{id}/parent
///
/// A `null` parent turns the page into a site root.
pub async fn set_parent(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(id): Path<DbId>,
    Json(input): Json<SetParentRequest>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .engine
        .hierarchy
        .set_parent(id, input.parent_id, user)
        .await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/pages/{id}/hostnames
pub async fn add_hostname(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path(id): Path<DbId>,
    Json(input): Json<AddHostnameRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let page = state
        .engine
        .hierarchy
        .add_hostname(id, &input.hostname, user)
        .await?;
    Ok(Json(DataResponse { data: page }))
}

/// DELETE /api/v1/pages/{id}/hostnames/{hostname}
pub async fn remove_hostname(
    State(state): State<AppState>,
    Actor(user): Actor,
    Path((id, hostname)): Path<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .engine
        .hierarchy
        .remove_hostname(id, &hostname, user)
        .await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/pages/{id}/breadcrumbs
pub async fn navigation(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let breadcrumbs = state.engine.hierarchy.breadcrumbs(id).await?;
    let url = breadcrumbs
        .last()
        .map(|b| b.url.clone())
        .unwrap_or_default();

    Ok(Json(DataResponse {
        data: Navigation { url, breadcrumbs },
    }))
}

/// GET /api/v1/pages/{id}/resolved
pub async fn resolved_page(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let resolved = state.engine.resolver.resolve_page(id).await?;
    Ok(Json(DataResponse { data: resolved }))
}
