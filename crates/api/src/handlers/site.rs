//! Public site resolution: request host and path to a fully resolved page.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use trellis_core::inheritance::ResolvedPage;
use trellis_core::types::DbId;
use trellis_db::models::page::Page;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SiteResolveQuery {
    /// Overrides the request's `Host` header.
    pub host: Option<String>,
    /// Slug path below the site root. Empty or absent means the root.
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SiteResolution {
    pub matched_hostname: String,
    pub root_id: DbId,
    pub page: Page,
    pub url: String,
    pub resolved: ResolvedPage,
}

/// GET /api/v1/site/resolve?host=..&path=..
///
/// Route the host to a site root, walk the path, and resolve the page's
/// effective layout, theme, and widgets.
pub async fn resolve_site(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SiteResolveQuery>,
) -> AppResult<impl IntoResponse> {
    let host = match query.host {
        Some(host) => host,
        None => headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("A host is required".into()))?,
    };

    let site = state.engine.router.resolve(&host).await?;
    let page = state
        .engine
        .hierarchy
        .resolve_path(site.root.id, query.path.as_deref().unwrap_or_default())
        .await?;
    let url = state.engine.hierarchy.absolute_url(page.id).await?;
    let resolved = state.engine.resolver.resolve_page(page.id).await?;

    Ok(Json(DataResponse {
        data: SiteResolution {
            matched_hostname: site.matched_hostname,
            root_id: site.root.id,
            page,
            url,
            resolved,
        },
    }))
}
