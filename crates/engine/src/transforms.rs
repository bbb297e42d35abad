//! Content transforms owned by the engine.

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::PgPool;
use trellis_core::content_ref::ContentTransform;
use trellis_core::error::CoreError;
use trellis_core::hierarchy::{absolute_url, validate_chain};
use trellis_core::types::DbId;
use trellis_db::repositories::PageRepo;

/// Expands a `page` reference to `{id, title, url}`.
#[derive(Clone)]
pub struct PageLinkTransform {
    pool: PgPool,
}

impl PageLinkTransform {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentTransform for PageLinkTransform {
    async fn transform(&self, id: DbId) -> Result<Option<Value>, CoreError> {
        let chain = PageRepo::ancestors(&self.pool, id)
            .await
            .map_err(|e| CoreError::Internal(format!("Page link lookup failed: {e}")))?;
        let Some(page) = chain.first() else {
            return Ok(None);
        };
        validate_chain(&chain)?;
        Ok(Some(json!({
            "id": page.id,
            "title": page.title,
            "url": absolute_url(&chain),
        })))
    }
}
