//! Route definitions for the page tree and page publication.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{pages, publication, versions};
use crate::state::AppState;

/// Page routes mounted at `/pages`.
///
/// ```text
/// POST   /                          -> create_page
/// POST   /bulk-publish              -> bulk_publish
/// GET    /{id}                      -> get_page
/// PUT    /{id}                      -> update_page
/// GET    /{id}/children             -> list_children
/// PUT    /{id}/parent               -> set_parent
/// POST   /{id}/hostnames            -> add_hostname
/// DELETE /{id}/hostnames/{hostname} -> remove_hostname
/// GET    /{id}/breadcrumbs          -> navigation
/// GET    /{id}/resolved             -> resolved_page
/// POST   /{id}/publish              -> publish_page
/// POST   /{id}/publish-now          -> publish_now
/// POST   /{id}/expire               -> expire_page
/// POST   /{id}/schedule             -> schedule_page
/// POST   /{id}/unpublish            -> unpublish_page
/// GET    /{id}/versions             -> list_versions
/// POST   /{id}/versions             -> create_version
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(pages::create_page))
        .route("/bulk-publish", post(publication::bulk_publish))
        .route("/{id}", get(pages::get_page).put(pages::update_page))
        .route("/{id}/children", get(pages::list_children))
        .route("/{id}/parent", put(pages::set_parent))
        .route("/{id}/hostnames", post(pages::add_hostname))
        .route("/{id}/hostnames/{hostname}", delete(pages::remove_hostname))
        .route("/{id}/breadcrumbs", get(pages::navigation))
        .route("/{id}/resolved", get(pages::resolved_page))
        .route("/{id}/publish", post(publication::publish_page))
        .route("/{id}/publish-now", post(publication::publish_now))
        .route("/{id}/expire", post(publication::expire_page))
        .route("/{id}/schedule", post(publication::schedule_page))
        .route("/{id}/unpublish", post(publication::unpublish_page))
        .route(
            "/{id}/versions",
            get(versions::list_versions).post(versions::create_version),
        )
}
