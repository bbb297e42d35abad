//! HierarchyStore: page tree structure, slugs, and hostname claims.

use sqlx::PgPool;
use trellis_core::error::CoreError;
use trellis_core::hierarchy::{
    absolute_url, breadcrumbs, check_parent_assignment, generate_slug, path_segments,
    validate_chain, validate_page_structure, Breadcrumb, PageStructure, MAX_TREE_DEPTH,
};
use trellis_core::hostname::{is_wildcard, normalize_hostname, parse_hostname};
use trellis_core::publication::PublicationStatus;
use trellis_core::types::DbId;
use trellis_core::versioning::PageData;
use trellis_db::models::page::{CreatePage, Page, UpdatePage};
use trellis_db::repositories::PageRepo;

use crate::error::{page_not_found, EngineResult};
use crate::Tx;

/// Owns parent/child structure, slugs, and hostnames.
#[derive(Clone)]
pub struct HierarchyStore {
    pool: PgPool,
}

impl HierarchyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_page(&self, id: DbId) -> EngineResult<Page> {
        PageRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| page_not_found(id))
    }

    /// Children ordered by `sort_order`, then id.
    pub async fn children(&self, id: DbId) -> EngineResult<Vec<Page>> {
        self.get_page(id).await?;
        Ok(PageRepo::children(&self.pool, id).await?)
    }

    /// The page and its ancestors, nearest first.
    pub async fn chain(&self, id: DbId) -> EngineResult<Vec<Page>> {
        let chain = PageRepo::ancestors(&self.pool, id).await?;
        if chain.is_empty() {
            return Err(page_not_found(id));
        }
        validate_chain(&chain)?;
        Ok(chain)
    }

    /// Breadcrumb trail root -> page.
    pub async fn breadcrumbs(&self, id: DbId) -> EngineResult<Vec<Breadcrumb>> {
        Ok(breadcrumbs(&self.chain(id).await?))
    }

    /// Slugs root -> page joined by `/`.
    pub async fn absolute_url(&self, id: DbId) -> EngineResult<String> {
        Ok(absolute_url(&self.chain(id).await?))
    }

    /// Descend from a root page through `path` one slug at a time.
    ///
    /// An empty path resolves to the root itself.
    pub async fn resolve_path(&self, root_id: DbId, path: &str) -> EngineResult<Page> {
        let segments = path_segments(path);
        if segments.len() >= MAX_TREE_DEPTH {
            return Err(CoreError::RouteNotFound(format!("path '{path}'")).into());
        }

        let mut current = self.get_page(root_id).await?;
        for segment in segments {
            current = PageRepo::find_child_by_slug(&self.pool, current.id, segment)
                .await?
                .ok_or_else(|| CoreError::RouteNotFound(format!("path '{path}'")))?;
        }
        Ok(current)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create an unpublished page with no versions.
    pub async fn create_page(&self, input: &CreatePage, user: Option<DbId>) -> EngineResult<Page> {
        let slug = match input.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => generate_slug(&input.title),
        };
        let data = PageData {
            title: input.title.trim().to_string(),
            slug,
            parent_id: input.parent_id,
            sort_order: input.sort_order.unwrap_or(0),
            layout_key: input.layout_key.clone().filter(|k| !k.is_empty()),
            theme_id: input.theme_id,
            publication_status: PublicationStatus::Unpublished,
            effective_date: input.effective_date,
            expiry_date: input.expiry_date,
            seo_title: input.seo_title.clone(),
            meta_description: input.meta_description.clone(),
            show_in_menus: input.show_in_menus.unwrap_or(true),
        };
        let raw_hostnames = input.hostnames.clone().unwrap_or_default();
        let hostnames = validate_page_structure(&PageStructure {
            title: &data.title,
            slug: &data.slug,
            parent_id: data.parent_id,
            hostnames: &raw_hostnames,
            effective_date: data.effective_date,
            expiry_date: data.expiry_date,
        })?;

        let mut tx = self.pool.begin().await?;

        if let Some(parent_id) = data.parent_id {
            check_parent(&mut tx, None, parent_id).await?;
        }
        ensure_slug_free(&mut tx, data.parent_id, &data.slug, None).await?;
        for hostname in &hostnames {
            ensure_hostname_free(&mut tx, hostname, None).await?;
        }

        let page = PageRepo::create(&mut *tx, &data, user).await?;
        for hostname in &hostnames {
            PageRepo::add_hostname(&mut *tx, page.id, hostname).await?;
        }
        let page = PageRepo::find_by_id(&mut *tx, page.id)
            .await?
            .ok_or_else(|| page_not_found(page.id))?;

        tx.commit().await?;

        tracing::info!(page_id = page.id, parent_id = ?page.parent_id, slug = %page.slug, "Page created");
        Ok(page)
    }

    /// Patch scalar fields and re-run the full validation on the merged state.
    pub async fn update_page(
        &self,
        id: DbId,
        patch: &UpdatePage,
        user: Option<DbId>,
    ) -> EngineResult<Page> {
        let mut tx = self.pool.begin().await?;
        let page = lock_page(&mut tx, id).await?;

        let mut data = page.to_page_data()?;
        patch.apply_to(&mut data);
        if data.layout_key.as_deref() == Some("") {
            data.layout_key = None;
        }

        let updated = write_validated(&mut tx, &page, &data, user).await?;
        tx.commit().await?;

        tracing::info!(page_id = id, "Page updated");
        Ok(updated)
    }

    /// Move a page. Rejects moves under itself or any descendant.
    pub async fn set_parent(
        &self,
        id: DbId,
        new_parent_id: Option<DbId>,
        user: Option<DbId>,
    ) -> EngineResult<Page> {
        let mut tx = self.pool.begin().await?;
        let page = lock_page(&mut tx, id).await?;

        let mut data = page.to_page_data()?;
        data.parent_id = new_parent_id;
        let updated = write_validated(&mut tx, &page, &data, user).await?;
        tx.commit().await?;

        tracing::info!(page_id = id, parent_id = ?new_parent_id, "Page moved");
        Ok(updated)
    }

    /// Claim a hostname for a root page.
    pub async fn add_hostname(&self, id: DbId, raw: &str, user: Option<DbId>) -> EngineResult<Page> {
        let hostname = parse_hostname(raw)?;

        let mut tx = self.pool.begin().await?;
        let page = lock_page(&mut tx, id).await?;

        if !page.is_root() {
            return Err(CoreError::Validation(
                "Hostnames can only be assigned to root pages".into(),
            )
            .into());
        }
        if page.hostnames.contains(&hostname) {
            return Ok(page);
        }
        ensure_hostname_free(&mut tx, &hostname, Some(id)).await?;

        PageRepo::add_hostname(&mut *tx, id, &hostname).await?;
        PageRepo::touch(&mut *tx, id, user).await?;
        let page = lock_page(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(page_id = id, hostname = %hostname, "Hostname claimed");
        Ok(page)
    }

    /// Release a hostname claim. The raw value is normalized first.
    pub async fn remove_hostname(
        &self,
        id: DbId,
        raw: &str,
        user: Option<DbId>,
    ) -> EngineResult<Page> {
        let hostname = normalize_hostname(raw);

        let mut tx = self.pool.begin().await?;
        let page = lock_page(&mut tx, id).await?;

        if !page.is_root() {
            return Err(CoreError::Validation(
                "Hostnames can only be managed on root pages".into(),
            )
            .into());
        }
        if !PageRepo::remove_hostname(&mut *tx, id, &hostname).await? {
            return Err(CoreError::Validation(format!(
                "Page {id} does not claim hostname '{hostname}'"
            ))
            .into());
        }
        PageRepo::touch(&mut *tx, id, user).await?;
        let page = lock_page(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(page_id = id, hostname = %hostname, "Hostname released");
        Ok(page)
    }
}

// ---------------------------------------------------------------------------
// Unit-of-work helpers
// ---------------------------------------------------------------------------

/// Take the page row lock inside `tx`.
pub(crate) async fn lock_page(tx: &mut Tx<'_>, id: DbId) -> EngineResult<Page> {
    PageRepo::lock_for_update(&mut **tx, id)
        .await?
        .ok_or_else(|| page_not_found(id))
}

/// Validate `data` as the next state of the locked `page` and write it.
///
/// Runs every persist-time rule: title, slug, dates, hostnames only on root,
/// parent existence and cycles, and sibling slug uniqueness. Hostnames are
/// never changed here.
pub(crate) async fn write_validated(
    tx: &mut Tx<'_>,
    page: &Page,
    data: &PageData,
    user: Option<DbId>,
) -> EngineResult<Page> {
    validate_page_structure(&PageStructure {
        title: &data.title,
        slug: &data.slug,
        parent_id: data.parent_id,
        hostnames: &page.hostnames,
        effective_date: data.effective_date,
        expiry_date: data.expiry_date,
    })?;

    if data.parent_id != page.parent_id {
        if let Some(parent_id) = data.parent_id {
            check_parent(tx, Some(page.id), parent_id).await?;
        }
    }
    if data.parent_id != page.parent_id || data.slug != page.slug {
        ensure_slug_free(tx, data.parent_id, &data.slug, Some(page.id)).await?;
    }

    PageRepo::write_data(&mut **tx, page.id, data, user)
        .await?
        .ok_or_else(|| page_not_found(page.id))
}

/// The proposed parent must exist and must not be `page_id` or one of its
/// descendants.
async fn check_parent(tx: &mut Tx<'_>, page_id: Option<DbId>, parent_id: DbId) -> EngineResult<()> {
    let parent_chain = PageRepo::ancestors(&mut **tx, parent_id).await?;
    if parent_chain.is_empty() {
        return Err(CoreError::Validation(format!("Parent page {parent_id} does not exist")).into());
    }
    let ids: Vec<DbId> = parent_chain.iter().map(|p| p.id).collect();
    match page_id {
        Some(page_id) => check_parent_assignment(page_id, &ids)?,
        None if ids.len() >= MAX_TREE_DEPTH => {
            return Err(CoreError::Validation(format!(
                "Page tree may not be deeper than {MAX_TREE_DEPTH} levels"
            ))
            .into())
        }
        None => {}
    }
    Ok(())
}

async fn ensure_slug_free(
    tx: &mut Tx<'_>,
    parent_id: Option<DbId>,
    slug: &str,
    exclude_id: Option<DbId>,
) -> EngineResult<()> {
    if PageRepo::slug_taken(&mut **tx, parent_id, slug, exclude_id).await? {
        return Err(CoreError::Conflict(format!(
            "Slug '{slug}' is already used by a sibling page"
        ))
        .into());
    }
    Ok(())
}

async fn ensure_hostname_free(
    tx: &mut Tx<'_>,
    hostname: &str,
    exclude_page_id: Option<DbId>,
) -> EngineResult<()> {
    if is_wildcard(hostname) {
        return Ok(());
    }
    if let Some(owner) = PageRepo::find_hostname_owner(&mut **tx, hostname, exclude_page_id).await? {
        return Err(CoreError::Conflict(format!(
            "Hostname '{hostname}' is already claimed by page {owner}"
        ))
        .into());
    }
    Ok(())
}
