//! Repository for the `page_versions` table.

use sqlx::types::Json;
use sqlx::PgExecutor;
use trellis_core::types::{DbId, Timestamp};
use trellis_core::versioning::{VersionStatus, WidgetRecord};

use crate::models::page_version::{NewPageVersion, PageVersion};

/// Column list for page_versions queries.
const COLUMNS: &str = "id, page_id, version_number, page_data, widgets, status_id, is_current, \
    published_at, published_by, description, created_by, updated_by, created_at, updated_at";

/// Provides data access for page versions.
pub struct PageVersionRepo;

impl PageVersionRepo {
    /// Insert a draft version, allocating the next version number for the
    /// page. Callers hold the page row lock, which serializes allocation.
    pub async fn create<'e, E>(executor: E, input: &NewPageVersion) -> Result<PageVersion, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO page_versions
                (page_id, version_number, page_data, widgets, status_id, description, created_by)
             VALUES ($1,
                     COALESCE((SELECT MAX(version_number) FROM page_versions WHERE page_id = $1), 0) + 1,
                     $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageVersion>(&query)
            .bind(input.page_id)
            .bind(Json(&input.page_data))
            .bind(Json(&input.widgets))
            .bind(VersionStatus::Draft.id())
            .bind(&input.description)
            .bind(input.created_by)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<PageVersion>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM page_versions WHERE id = $1");
        sqlx::query_as::<_, PageVersion>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// All versions of a page, newest first.
    pub async fn list_for_page<'e, E>(
        executor: E,
        page_id: DbId,
    ) -> Result<Vec<PageVersion>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM page_versions
             WHERE page_id = $1
             ORDER BY version_number DESC"
        );
        sqlx::query_as::<_, PageVersion>(&query)
            .bind(page_id)
            .fetch_all(executor)
            .await
    }

    /// The published version flagged current, if any.
    pub async fn find_current<'e, E>(
        executor: E,
        page_id: DbId,
    ) -> Result<Option<PageVersion>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM page_versions
             WHERE page_id = $1 AND is_current = true AND status_id = $2"
        );
        sqlx::query_as::<_, PageVersion>(&query)
            .bind(page_id)
            .bind(VersionStatus::Published.id())
            .fetch_optional(executor)
            .await
    }

    /// Current versions for several pages at once (resolution chains).
    pub async fn find_current_for_pages<'e, E>(
        executor: E,
        page_ids: &[DbId],
    ) -> Result<Vec<PageVersion>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM page_versions
             WHERE page_id = ANY($1) AND is_current = true AND status_id = $2"
        );
        sqlx::query_as::<_, PageVersion>(&query)
            .bind(page_ids)
            .bind(VersionStatus::Published.id())
            .fetch_all(executor)
            .await
    }

    /// Highest-numbered draft.
    pub async fn find_latest_draft<'e, E>(
        executor: E,
        page_id: DbId,
    ) -> Result<Option<PageVersion>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM page_versions
             WHERE page_id = $1 AND status_id = $2
             ORDER BY version_number DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, PageVersion>(&query)
            .bind(page_id)
            .bind(VersionStatus::Draft.id())
            .fetch_optional(executor)
            .await
    }

    /// Clear the current flag on every version of the page except `keep_id`.
    pub async fn clear_current<'e, E>(
        executor: E,
        page_id: DbId,
        keep_id: DbId,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE page_versions SET is_current = false
             WHERE page_id = $1 AND is_current = true AND id <> $2",
        )
        .bind(page_id)
        .bind(keep_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Mark a version published and current. Run `clear_current` first in
    /// the same transaction.
    pub async fn mark_published<'e, E>(
        executor: E,
        id: DbId,
        published_by: Option<DbId>,
        published_at: Timestamp,
    ) -> Result<Option<PageVersion>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE page_versions
             SET status_id = $2, is_current = true, published_at = $3, published_by = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageVersion>(&query)
            .bind(id)
            .bind(VersionStatus::Published.id())
            .bind(published_at)
            .bind(published_by)
            .fetch_optional(executor)
            .await
    }

    /// Replace the widget list of a draft. Returns `None` when the version
    /// does not exist or is no longer a draft.
    pub async fn replace_draft_widgets<'e, E>(
        executor: E,
        id: DbId,
        widgets: &[WidgetRecord],
        updated_by: Option<DbId>,
    ) -> Result<Option<PageVersion>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE page_versions SET widgets = $2, updated_by = $4
             WHERE id = $1 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageVersion>(&query)
            .bind(id)
            .bind(Json(widgets))
            .bind(VersionStatus::Draft.id())
            .bind(updated_by)
            .fetch_optional(executor)
            .await
    }
}
