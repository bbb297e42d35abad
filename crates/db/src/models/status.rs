//! Status ids stored in SMALLINT columns.
//!
//! The enums themselves live in `trellis-core` (`PublicationStatus`,
//! `VersionStatus`) because the state machine rules are defined there; this
//! module maps raw ids back to them.

use trellis_core::error::CoreError;
use trellis_core::publication::PublicationStatus;
use trellis_core::versioning::VersionStatus;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

pub fn publication_status(id: StatusId) -> Result<PublicationStatus, CoreError> {
    PublicationStatus::from_id(id)
        .ok_or_else(|| CoreError::Internal(format!("Unknown publication status id {id}")))
}

pub fn version_status(id: StatusId) -> Result<VersionStatus, CoreError> {
    VersionStatus::from_id(id)
        .ok_or_else(|| CoreError::Internal(format!("Unknown version status id {id}")))
}
