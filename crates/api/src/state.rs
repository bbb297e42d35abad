use std::sync::Arc;

use trellis_core::content_ref::TransformRegistry;
use trellis_core::widget_types::builtin_widget_types;
use trellis_db::registry::{PgLayoutRegistry, PgThemeRegistry};
use trellis_db::DbPool;
use trellis_engine::Engine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the engine and config sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Page services: hierarchy, routing, versions, publication, resolution.
    pub engine: Arc<Engine>,
}

impl AppState {
    /// Wire the engine over database-backed layout and theme registries and
    /// the built-in widget types.
    pub fn new(pool: DbPool, config: ServerConfig) -> Self {
        let engine = Engine::new(
            pool.clone(),
            Arc::new(PgLayoutRegistry::new(pool.clone())),
            Arc::new(PgThemeRegistry::new(pool.clone())),
            Arc::new(builtin_widget_types()),
            TransformRegistry::new(),
        );
        Self {
            pool,
            config: Arc::new(config),
            engine: Arc::new(engine),
        }
    }
}
