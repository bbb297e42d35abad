use axum::routing::{get, put};
use axum::Router;

use crate::handlers::registry;
use crate::state::AppState;

/// Layout routes mounted at `/layouts`.
///
/// ```text
/// GET  /              -> list_layouts
/// POST /              -> create_layout
/// PUT  /{key}/active  -> set_layout_active
/// ```
pub fn layouts_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(registry::list_layouts).post(registry::create_layout),
        )
        .route("/{key}/active", put(registry::set_layout_active))
}

/// Theme routes mounted at `/themes`.
///
/// ```text
/// GET  /  -> list_themes
/// POST /  -> create_theme
/// ```
pub fn themes_router() -> Router<AppState> {
    Router::new().route("/", get(registry::list_themes).post(registry::create_theme))
}
