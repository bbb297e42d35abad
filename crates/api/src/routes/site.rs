use axum::routing::get;
use axum::Router;

use crate::handlers::site;
use crate::state::AppState;

/// Site routes mounted at `/site`.
///
/// ```text
/// GET /resolve?host=..&path=..  -> resolve_site
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/resolve", get(site::resolve_site))
}
