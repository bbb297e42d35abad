//! Page version entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use trellis_core::error::CoreError;
use trellis_core::types::{DbId, Timestamp};
use trellis_core::versioning::{PageData, VersionStatus, VersionSummary, WidgetRecord};

use super::status::{version_status, StatusId};

/// A row from the `page_versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PageVersion {
    pub id: DbId,
    pub page_id: DbId,
    pub version_number: i32,
    pub page_data: Json<PageData>,
    pub widgets: Json<Vec<WidgetRecord>>,
    pub status_id: StatusId,
    pub is_current: bool,
    pub published_at: Option<Timestamp>,
    pub published_by: Option<DbId>,
    pub description: Option<String>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PageVersion {
    pub fn status(&self) -> Result<VersionStatus, CoreError> {
        version_status(self.status_id)
    }

    pub fn summary(&self) -> Result<VersionSummary, CoreError> {
        Ok(VersionSummary {
            version_number: self.version_number,
            status: self.status()?,
            is_current: self.is_current,
        })
    }
}

/// Insert payload for a new version. Always inserted as a draft; publishing
/// is a separate step inside the same transaction.
#[derive(Debug, Clone)]
pub struct NewPageVersion {
    pub page_id: DbId,
    pub page_data: PageData,
    pub widgets: Vec<WidgetRecord>,
    pub description: Option<String>,
    pub created_by: Option<DbId>,
}

/// DTO for `createVersion` requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePageVersion {
    pub description: Option<String>,
    pub status: Option<VersionStatus>,
    #[serde(default)]
    pub auto_publish: bool,
}
