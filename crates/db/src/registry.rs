//! Database-backed layout and theme registries.

use async_trait::async_trait;
use sqlx::PgPool;
use trellis_core::error::CoreError;
use trellis_core::registry::{LayoutDescriptor, LayoutRegistry, ThemeDescriptor, ThemeRegistry};
use trellis_core::types::DbId;

use crate::repositories::{LayoutRepo, ThemeRepo};

fn registry_error(what: &str, e: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("{what} lookup failed: {e}"))
}

/// Layout registry over the `layouts` table.
#[derive(Clone)]
pub struct PgLayoutRegistry {
    pool: PgPool,
}

impl PgLayoutRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LayoutRegistry for PgLayoutRegistry {
    async fn lookup(&self, key: &str) -> Result<Option<LayoutDescriptor>, CoreError> {
        LayoutRepo::find_active_by_key(&self.pool, key)
            .await
            .map(|row| row.map(LayoutDescriptor::from))
            .map_err(|e| registry_error("Layout", e))
    }

    async fn list_active(&self) -> Result<Vec<LayoutDescriptor>, CoreError> {
        LayoutRepo::list_active(&self.pool)
            .await
            .map(|rows| rows.into_iter().map(LayoutDescriptor::from).collect())
            .map_err(|e| registry_error("Layout", e))
    }
}

/// Theme registry over the `themes` table.
#[derive(Clone)]
pub struct PgThemeRegistry {
    pool: PgPool,
}

impl PgThemeRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThemeRegistry for PgThemeRegistry {
    async fn get(&self, id: DbId) -> Result<Option<ThemeDescriptor>, CoreError> {
        ThemeRepo::find_by_id(&self.pool, id)
            .await
            .map(|row| row.map(ThemeDescriptor::from))
            .map_err(|e| registry_error("Theme", e))
    }
}
