//! Acting-user extractor.
//!
//! Authentication lives in front of this service; the gateway forwards the
//! authenticated user's id in `x-user-id`. The id is recorded on audit
//! fields (`created_by`, `updated_by`, `published_by`).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use trellis_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user performing a request, or `None` for system callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub Option<DbId>);

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(Actor(None));
        };

        let user_id = raw
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<DbId>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                AppError::BadRequest(format!("{USER_ID_HEADER} must be a positive integer"))
            })?;

        Ok(Actor(Some(user_id)))
    }
}
