//! Repository for the `pages` and `page_hostnames` tables.

use sqlx::PgExecutor;
use trellis_core::hierarchy::MAX_TREE_DEPTH;
use trellis_core::publication::{PublicationState, PublicationStatus};
use trellis_core::types::{DbId, Timestamp};
use trellis_core::versioning::PageData;

use crate::models::page::{HostnameMatch, Page};

/// Column list for pages queries. Qualified so it can sit next to CTEs.
const COLUMNS: &str = "pages.id, pages.parent_id, pages.title, pages.slug, pages.sort_order, \
    pages.layout_key, pages.theme_id, pages.status_id, pages.effective_date, \
    pages.expiry_date, pages.seo_title, pages.meta_description, pages.show_in_menus, \
    ARRAY(SELECT h.hostname FROM page_hostnames h WHERE h.page_id = pages.id ORDER BY h.id) \
        AS hostnames, \
    pages.created_by, pages.updated_by, pages.created_at, pages.updated_at";

/// Provides data access for pages and their hostname claims.
pub struct PageRepo;

impl PageRepo {
    // -----------------------------------------------------------------------
    // Pages
    // -----------------------------------------------------------------------

    /// Insert a page from validated data. Hostnames are added separately.
    pub async fn create<'e, E>(
        executor: E,
        data: &PageData,
        created_by: Option<DbId>,
    ) -> Result<Page, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO pages
                (parent_id, title, slug, sort_order, layout_key, theme_id, status_id,
                 effective_date, expiry_date, seo_title, meta_description, show_in_menus,
                 created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(data.parent_id)
            .bind(&data.title)
            .bind(&data.slug)
            .bind(data.sort_order)
            .bind(&data.layout_key)
            .bind(data.theme_id)
            .bind(data.publication_status.id())
            .bind(data.effective_date)
            .bind(data.expiry_date)
            .bind(&data.seo_title)
            .bind(&data.meta_description)
            .bind(data.show_in_menus)
            .bind(created_by)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Page>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE pages.id = $1");
        sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Load a page and take its row lock for the rest of the transaction.
    ///
    /// Every mutating engine operation starts here so that concurrent writes
    /// to one page serialize.
    pub async fn lock_for_update<'e, E>(executor: E, id: DbId) -> Result<Option<Page>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE pages.id = $1 FOR UPDATE OF pages");
        sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// The page followed by its ancestors, nearest first, ending at the root.
    ///
    /// The walk stops after `MAX_TREE_DEPTH` steps, so a corrupted cycle
    /// yields an over-long chain instead of looping.
    pub async fn ancestors<'e, E>(executor: E, id: DbId) -> Result<Vec<Page>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "WITH RECURSIVE chain AS (
                 SELECT p.id, p.parent_id, 0 AS depth FROM pages p WHERE p.id = $1
                 UNION ALL
                 SELECT p.id, p.parent_id, c.depth + 1
                 FROM pages p
                 JOIN chain c ON p.id = c.parent_id
                 WHERE c.depth < $2
             )
             SELECT {COLUMNS}
             FROM chain
             JOIN pages ON pages.id = chain.id
             ORDER BY chain.depth"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .bind(MAX_TREE_DEPTH as i32)
            .fetch_all(executor)
            .await
    }

    /// Direct children ordered by `sort_order`, then id.
    pub async fn children<'e, E>(executor: E, parent_id: DbId) -> Result<Vec<Page>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM pages
             WHERE pages.parent_id = $1
             ORDER BY pages.sort_order, pages.id"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(parent_id)
            .fetch_all(executor)
            .await
    }

    pub async fn find_child_by_slug<'e, E>(
        executor: E,
        parent_id: DbId,
        slug: &str,
    ) -> Result<Option<Page>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM pages WHERE pages.parent_id = $1 AND pages.slug = $2"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(parent_id)
            .bind(slug)
            .fetch_optional(executor)
            .await
    }

    /// Whether a sibling (same parent, root pages being siblings of each
    /// other) other than `exclude_id` already uses `slug`.
    pub async fn slug_taken<'e, E>(
        executor: E,
        parent_id: Option<DbId>,
        slug: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(
                 SELECT 1 FROM pages
                 WHERE parent_id IS NOT DISTINCT FROM $1
                   AND slug = $2
                   AND ($3::BIGINT IS NULL OR id <> $3)
             )",
        )
        .bind(parent_id)
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    /// Overwrite every scalar column from `data`.
    pub async fn write_data<'e, E>(
        executor: E,
        id: DbId,
        data: &PageData,
        updated_by: Option<DbId>,
    ) -> Result<Option<Page>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE pages SET
                parent_id = $2, title = $3, slug = $4, sort_order = $5, layout_key = $6,
                theme_id = $7, status_id = $8, effective_date = $9, expiry_date = $10,
                seo_title = $11, meta_description = $12, show_in_menus = $13, updated_by = $14
             WHERE pages.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .bind(data.parent_id)
            .bind(&data.title)
            .bind(&data.slug)
            .bind(data.sort_order)
            .bind(&data.layout_key)
            .bind(data.theme_id)
            .bind(data.publication_status.id())
            .bind(data.effective_date)
            .bind(data.expiry_date)
            .bind(&data.seo_title)
            .bind(&data.meta_description)
            .bind(data.show_in_menus)
            .bind(updated_by)
            .fetch_optional(executor)
            .await
    }

    /// Write status and schedule dates.
    pub async fn set_publication_state<'e, E>(
        executor: E,
        id: DbId,
        state: &PublicationState,
        updated_by: Option<DbId>,
    ) -> Result<Option<Page>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE pages SET status_id = $2, effective_date = $3, expiry_date = $4, updated_by = $5
             WHERE pages.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .bind(state.status.id())
            .bind(state.effective_date)
            .bind(state.expiry_date)
            .bind(updated_by)
            .fetch_optional(executor)
            .await
    }

    /// Touch audit columns after a change made to a child table.
    pub async fn touch<'e, E>(
        executor: E,
        id: DbId,
        updated_by: Option<DbId>,
    ) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("UPDATE pages SET updated_by = $2 WHERE id = $1")
            .bind(id)
            .bind(updated_by)
            .execute(executor)
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Hostnames
    // -----------------------------------------------------------------------

    pub async fn add_hostname<'e, E>(
        executor: E,
        page_id: DbId,
        hostname: &str,
    ) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("INSERT INTO page_hostnames (page_id, hostname) VALUES ($1, $2)")
            .bind(page_id)
            .bind(hostname)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Returns `true` if the claim existed and was removed.
    pub async fn remove_hostname<'e, E>(
        executor: E,
        page_id: DbId,
        hostname: &str,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM page_hostnames WHERE page_id = $1 AND hostname = $2")
            .bind(page_id)
            .bind(hostname)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Pages other than `exclude_page_id` that claim `hostname`.
    pub async fn find_hostname_owner<'e, E>(
        executor: E,
        hostname: &str,
        exclude_page_id: Option<DbId>,
    ) -> Result<Option<DbId>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT page_id FROM page_hostnames
             WHERE hostname = $1 AND ($2::BIGINT IS NULL OR page_id <> $2)
             ORDER BY id
             LIMIT 1",
        )
        .bind(hostname)
        .bind(exclude_page_id)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// First root page claiming one of `candidates`, in candidate order.
    pub async fn find_root_by_hostnames<'e, E>(
        executor: E,
        candidates: &[String],
    ) -> Result<Option<HostnameMatch>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT h.hostname AS matched_hostname, {COLUMNS}
             FROM page_hostnames h
             JOIN pages ON pages.id = h.page_id
             WHERE h.hostname = ANY($1) AND pages.parent_id IS NULL
             ORDER BY array_position($1, h.hostname), pages.id
             LIMIT 1"
        );
        sqlx::query_as::<_, HostnameMatch>(&query)
            .bind(candidates)
            .fetch_optional(executor)
            .await
    }

    // -----------------------------------------------------------------------
    // Batch candidates
    // -----------------------------------------------------------------------

    /// Scheduled pages whose window has opened at `now`.
    pub async fn list_due_for_publication<'e, E>(
        executor: E,
        now: Timestamp,
    ) -> Result<Vec<DbId>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM pages
             WHERE status_id = $1
               AND effective_date <= $2
               AND (expiry_date IS NULL OR expiry_date > $2)
             ORDER BY effective_date, id",
        )
        .bind(PublicationStatus::Scheduled.id())
        .bind(now)
        .fetch_all(executor)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Published pages whose expiry date has passed at `now`.
    pub async fn list_due_for_expiry<'e, E>(
        executor: E,
        now: Timestamp,
    ) -> Result<Vec<DbId>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM pages
             WHERE status_id = $1 AND expiry_date <= $2
             ORDER BY expiry_date, id",
        )
        .bind(PublicationStatus::Published.id())
        .bind(now)
        .fetch_all(executor)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}
