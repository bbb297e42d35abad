pub mod health;
pub mod pages;
pub mod registry;
pub mod site;
pub mod versions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /site/resolve                                     host + path -> resolved page
///
/// /pages                                            create
/// /pages/bulk-publish                               publish-with-date for many pages
/// /pages/{id}                                       get, update
/// /pages/{id}/children                              direct children
/// /pages/{id}/parent                                move (PUT)
/// /pages/{id}/hostnames                             claim hostname (POST)
/// /pages/{id}/hostnames/{hostname}                  release hostname (DELETE)
/// /pages/{id}/breadcrumbs                           url + breadcrumb trail
/// /pages/{id}/resolved                              effective layout, theme, widgets
/// /pages/{id}/publish                               publish (POST)
/// /pages/{id}/publish-now                           publish with optional date (POST)
/// /pages/{id}/expire                                expire (POST)
/// /pages/{id}/schedule                              set schedule (POST)
/// /pages/{id}/unpublish                             unpublish (POST)
/// /pages/{id}/versions                              history, create
///
/// /versions/compare                                 diff (?a, b)
/// /versions/{id}                                    get
/// /versions/{id}/widgets                            replace draft widgets (PUT)
/// /versions/{id}/publish                            publish version (POST)
/// /versions/{id}/restore                            restore (POST)
/// /versions/{id}/draft                              draft from published (POST)
///
/// /layouts                                          list active, register
/// /layouts/{key}/active                             activate, retire (PUT)
///
/// /themes                                           list, create
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Public site resolution.
        .nest("/site", site::router())
        // Page tree, hostnames, and publication.
        .nest("/pages", pages::router())
        // Version snapshots.
        .nest("/versions", versions::router())
        // Layout and theme registries.
        .nest("/layouts", registry::layouts_router())
        .nest("/themes", registry::themes_router())
}
