use trellis_core::error::CoreError;
use trellis_core::types::DbId;

/// Errors from engine services.
///
/// `Core` covers business rule failures; `Database` is a storage or
/// transaction failure and is the only kind the state machine lets escape.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

pub(crate) fn page_not_found(id: DbId) -> EngineError {
    CoreError::NotFound { entity: "page", id }.into()
}

pub(crate) fn version_not_found(id: DbId) -> EngineError {
    CoreError::NotFound {
        entity: "page_version",
        id,
    }
    .into()
}
