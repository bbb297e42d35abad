//! Registered layout model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use trellis_core::registry::LayoutDescriptor;
use trellis_core::types::{DbId, Timestamp};

/// A row from the `layouts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Layout {
    pub id: DbId,
    pub key: String,
    pub name: String,
    pub slots: Vec<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Layout> for LayoutDescriptor {
    fn from(row: Layout) -> Self {
        LayoutDescriptor {
            key: row.key,
            name: row.name,
            slots: row.slots,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLayout {
    pub key: String,
    pub name: String,
    pub slots: Vec<String>,
    pub is_active: Option<bool>,
}
