//! Registered theme model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use trellis_core::registry::ThemeDescriptor;
use trellis_core::types::{DbId, Timestamp};

/// A row from the `themes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Theme {
    pub id: DbId,
    pub name: String,
    pub tokens: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Theme> for ThemeDescriptor {
    fn from(row: Theme) -> Self {
        ThemeDescriptor {
            id: row.id,
            name: row.name,
            tokens: row.tokens,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTheme {
    pub name: String,
    pub tokens: Option<serde_json::Value>,
}
