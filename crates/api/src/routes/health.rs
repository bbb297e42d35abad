use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Service health: database reachability and schema freshness.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable or behind.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Newest migration applied to the database.
    pub schema_version: Option<i64>,
    /// Newest migration this build ships.
    pub expected_schema_version: Option<i64>,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = trellis_db::health_check(&state.pool).await.is_ok();
    let schema_version = if db_healthy {
        trellis_db::schema_version(&state.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Health check could not read schema version");
                None
            })
    } else {
        None
    };
    let expected_schema_version = trellis_db::latest_migration();

    let status = if db_healthy && schema_version == expected_schema_version {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        schema_version,
        expected_schema_version,
    })
}

/// Root-level routes, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
