//! Page resolution over stored chains: loads a page's ancestors and their
//! current versions, then hands the chain to the inheritance rules.

use std::collections::HashMap;

use sqlx::PgPool;
use trellis_core::content_ref::TransformRegistry;
use trellis_core::hierarchy::validate_chain;
use trellis_core::inheritance::{
    resolve_slot, ChainLink, InheritanceResolver, ResolvedLayout, ResolvedPage, ResolvedTheme,
    ResolvedWidget,
};
use trellis_core::types::DbId;
use trellis_db::repositories::{PageRepo, PageVersionRepo};

use crate::error::{page_not_found, EngineResult};

#[derive(Clone)]
pub struct PageResolver {
    pool: PgPool,
    resolver: InheritanceResolver,
    transforms: TransformRegistry,
}

impl PageResolver {
    pub fn new(pool: PgPool, resolver: InheritanceResolver, transforms: TransformRegistry) -> Self {
        Self {
            pool,
            resolver,
            transforms,
        }
    }

    /// Layout, theme, and every slot, with object references expanded.
    pub async fn resolve_page(&self, page_id: DbId) -> EngineResult<ResolvedPage> {
        let chain = self.load_chain(page_id).await?;
        let mut resolved = self.resolver.resolve(&chain).await?;
        self.transforms.expand_page(&mut resolved).await?;

        tracing::debug!(
            page_id,
            chain_len = chain.len(),
            slots = resolved.slots.len(),
            "Page resolved"
        );
        Ok(resolved)
    }

    pub async fn resolve_slot(&self, page_id: DbId, slot: &str) -> EngineResult<Vec<ResolvedWidget>> {
        let chain = self.load_chain(page_id).await?;
        Ok(resolve_slot(&chain, slot))
    }

    pub async fn resolve_layout(&self, page_id: DbId) -> EngineResult<Option<ResolvedLayout>> {
        let chain = self.load_chain(page_id).await?;
        Ok(self.resolver.resolve_layout(&chain).await?)
    }

    pub async fn resolve_theme(&self, page_id: DbId) -> EngineResult<Option<ResolvedTheme>> {
        let chain = self.load_chain(page_id).await?;
        Ok(self.resolver.resolve_theme(&chain).await?)
    }

    /// The page and its ancestors, nearest first, each carrying the widgets
    /// of its current published version. Pages with no published version
    /// contribute no widgets.
    async fn load_chain(&self, page_id: DbId) -> EngineResult<Vec<ChainLink>> {
        let pages = PageRepo::ancestors(&self.pool, page_id).await?;
        if pages.is_empty() {
            return Err(page_not_found(page_id));
        }
        validate_chain(&pages)?;

        let ids: Vec<DbId> = pages.iter().map(|p| p.id).collect();
        let mut widgets: HashMap<DbId, _> = PageVersionRepo::find_current_for_pages(&self.pool, &ids)
            .await?
            .into_iter()
            .map(|v| (v.page_id, v.widgets.0))
            .collect();

        Ok(pages
            .into_iter()
            .map(|page| ChainLink {
                widgets: widgets.remove(&page.id).unwrap_or_default(),
                page_id: page.id,
                layout_key: page.layout_key,
                theme_id: page.theme_id,
            })
            .collect())
    }
}
