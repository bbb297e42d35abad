use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::versions;
use crate::state::AppState;

/// Version routes mounted at `/versions`.
///
/// ```text
/// GET  /compare?a=..&b=..  -> compare_versions
/// GET  /{id}               -> get_version
/// PUT  /{id}/widgets       -> replace_widgets
/// POST /{id}/publish       -> publish_version
/// POST /{id}/restore       -> restore_version
/// POST /{id}/draft         -> create_draft
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/compare", get(versions::compare_versions))
        .route("/{id}", get(versions::get_version))
        .route("/{id}/widgets", put(versions::replace_widgets))
        .route("/{id}/publish", post(versions::publish_version))
        .route("/{id}/restore", post(versions::restore_version))
        .route("/{id}/draft", post(versions::create_draft))
}
