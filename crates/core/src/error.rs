use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Nothing is routed at a hostname or path.
    #[error("No route for {0}")]
    RouteNotFound(String),

    /// A rule on page structure, dates, hostnames, or widget config was broken.
    /// Always raised before anything is persisted.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A hostname or slug is already claimed elsewhere.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether this error is a validation failure. Conflicts count: they are
    /// uniqueness rules checked against stored state.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_) | CoreError::Conflict(_))
    }
}
