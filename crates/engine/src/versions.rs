//! VersionStore: immutable page snapshots, the current-version flag,
//! rollback, and comparison.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use trellis_core::diff::{compare_snapshots, SnapshotDiff};
use trellis_core::error::CoreError;
use trellis_core::types::DbId;
use trellis_core::versioning::{
    check_current_invariant, current_version, has_unpublished_changes, latest_draft, PageData,
    VersionStatus, VersionSummary, WidgetRecord,
};
use trellis_core::widget_types::{prepare_widgets, WidgetTypeRegistry};
use trellis_db::models::page::Page;
use trellis_db::models::page_version::{CreatePageVersion, NewPageVersion, PageVersion};
use trellis_db::repositories::PageVersionRepo;

use crate::error::{version_not_found, EngineResult};
use crate::hierarchy::{lock_page, write_validated};
use crate::Tx;

/// A page's version list with the derived flags.
#[derive(Debug, Clone, Serialize)]
pub struct VersionHistory {
    pub versions: Vec<PageVersion>,
    pub current_version_id: Option<DbId>,
    pub latest_draft_id: Option<DbId>,
    pub has_unpublished_changes: bool,
}

/// Result of a restore: the version preserving what was overwritten, and
/// the page after the snapshot was applied.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    pub backup: PageVersion,
    pub page: Page,
}

#[derive(Clone)]
pub struct VersionStore {
    pool: PgPool,
    widget_types: Arc<dyn WidgetTypeRegistry>,
}

impl VersionStore {
    pub fn new(pool: PgPool, widget_types: Arc<dyn WidgetTypeRegistry>) -> Self {
        Self { pool, widget_types }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn get_version(&self, id: DbId) -> EngineResult<PageVersion> {
        PageVersionRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| version_not_found(id))
    }

    /// Newest first.
    pub async fn list_versions(&self, page_id: DbId) -> EngineResult<Vec<PageVersion>> {
        Ok(PageVersionRepo::list_for_page(&self.pool, page_id).await?)
    }

    pub async fn current_version(&self, page_id: DbId) -> EngineResult<Option<PageVersion>> {
        Ok(PageVersionRepo::find_current(&self.pool, page_id).await?)
    }

    pub async fn latest_draft(&self, page_id: DbId) -> EngineResult<Option<PageVersion>> {
        Ok(PageVersionRepo::find_latest_draft(&self.pool, page_id).await?)
    }

    pub async fn has_unpublished_changes(&self, page_id: DbId) -> EngineResult<bool> {
        let versions = self.list_versions(page_id).await?;
        Ok(has_unpublished_changes(&summaries(&versions)?))
    }

    /// Versions plus current, latest draft, and unpublished-changes flag.
    pub async fn history(&self, page_id: DbId) -> EngineResult<VersionHistory> {
        let versions = self.list_versions(page_id).await?;
        let summaries = summaries(&versions)?;
        check_current_invariant(&summaries)?;

        let id_of = |summary: &VersionSummary| {
            versions
                .iter()
                .find(|v| v.version_number == summary.version_number)
                .map(|v| v.id)
        };
        let current_version_id = current_version(&summaries).and_then(id_of);
        let latest_draft_id = latest_draft(&summaries).and_then(id_of);

        Ok(VersionHistory {
            current_version_id,
            latest_draft_id,
            has_unpublished_changes: has_unpublished_changes(&summaries),
            versions,
        })
    }

    /// Field diff plus widget diff keyed by `(slot, order)`. `a` is the
    /// reference side: widgets only in `a` are reported as added.
    pub async fn compare(&self, a: DbId, b: DbId) -> EngineResult<SnapshotDiff> {
        let left = self.get_version(a).await?;
        let right = self.get_version(b).await?;
        Ok(compare_snapshots(
            &left.page_data.0,
            &left.widgets.0,
            &right.page_data.0,
            &right.widgets.0,
        ))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Snapshot the page's present state as a new version.
    ///
    /// Publishes it in the same transaction when `auto_publish` is set or the
    /// requested status is `published`.
    pub async fn create_version(
        &self,
        page_id: DbId,
        input: &CreatePageVersion,
        user: Option<DbId>,
    ) -> EngineResult<PageVersion> {
        let publish = input.auto_publish || input.status == Some(VersionStatus::Published);
        if input.status == Some(VersionStatus::Archived) {
            return Err(CoreError::Validation(
                "Versions cannot be created as archived".into(),
            )
            .into());
        }

        let mut tx = self.pool.begin().await?;
        let page = lock_page(&mut tx, page_id).await?;
        let version =
            create_version_in(&mut tx, &page, input.description.clone(), publish, user).await?;
        tx.commit().await?;

        Ok(version)
    }

    /// Publish a version and write its snapshot back onto the live page.
    ///
    /// A draft is published in place. A version that was published before
    /// is copied into a new published version so its own record stays
    /// immutable.
    pub async fn publish(&self, version_id: DbId, user: Option<DbId>) -> EngineResult<PageVersion> {
        let page_id = self.get_version(version_id).await?.page_id;

        let mut tx = self.pool.begin().await?;
        let page = lock_page(&mut tx, page_id).await?;
        let version = PageVersionRepo::find_by_id(&mut *tx, version_id)
            .await?
            .ok_or_else(|| version_not_found(version_id))?;

        let published = match version.status()? {
            VersionStatus::Draft => make_current(&mut tx, &version, user).await?,
            _ if version.is_current => {
                return Err(CoreError::Conflict(format!(
                    "Version {} is already the current version",
                    version.version_number
                ))
                .into())
            }
            _ => {
                let copy = PageVersionRepo::create(
                    &mut *tx,
                    &NewPageVersion {
                        page_id,
                        page_data: version.page_data.0.clone(),
                        widgets: version.widgets.0.clone(),
                        description: Some(format!(
                            "Republished from version {}",
                            version.version_number
                        )),
                        created_by: user,
                    },
                )
                .await?;
                make_current(&mut tx, &copy, user).await?
            }
        };

        write_validated(&mut tx, &page, &published.page_data.0, user).await?;
        tx.commit().await?;

        tracing::info!(
            page_id,
            version_id = published.id,
            version_number = published.version_number,
            "Version published"
        );
        Ok(published)
    }

    /// Roll the live page back to a version's snapshot, first preserving the
    /// present state as a new draft.
    pub async fn restore(&self, version_id: DbId, user: Option<DbId>) -> EngineResult<RestoreOutcome> {
        let page_id = self.get_version(version_id).await?.page_id;

        let mut tx = self.pool.begin().await?;
        let page = lock_page(&mut tx, page_id).await?;
        let target = PageVersionRepo::find_by_id(&mut *tx, version_id)
            .await?
            .ok_or_else(|| version_not_found(version_id))?;

        let backup = create_version_in(
            &mut tx,
            &page,
            Some(format!("Before restoring version {}", target.version_number)),
            false,
            user,
        )
        .await?;
        let page = write_validated(&mut tx, &page, &target.page_data.0, user).await?;
        tx.commit().await?;

        tracing::info!(
            page_id,
            restored_version = target.version_number,
            backup_version = backup.version_number,
            "Version restored"
        );
        Ok(RestoreOutcome { backup, page })
    }

    /// Start a new draft from a published version's snapshot.
    pub async fn create_draft_from_published(
        &self,
        version_id: DbId,
        description: Option<String>,
        user: Option<DbId>,
    ) -> EngineResult<PageVersion> {
        let source = self.get_version(version_id).await?;
        if source.status()? != VersionStatus::Published {
            return Err(CoreError::Validation(format!(
                "Version {} is not published",
                source.version_number
            ))
            .into());
        }

        let mut tx = self.pool.begin().await?;
        lock_page(&mut tx, source.page_id).await?;
        let draft = PageVersionRepo::create(
            &mut *tx,
            &NewPageVersion {
                page_id: source.page_id,
                page_data: source.page_data.0.clone(),
                widgets: source.widgets.0.clone(),
                description,
                created_by: user,
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            page_id = source.page_id,
            from_version = source.version_number,
            version_number = draft.version_number,
            "Draft created from published version"
        );
        Ok(draft)
    }

    /// Replace a draft's widget list after validating every widget against
    /// the widget-type registry.
    pub async fn replace_draft_widgets(
        &self,
        version_id: DbId,
        widgets: Vec<WidgetRecord>,
        user: Option<DbId>,
    ) -> EngineResult<PageVersion> {
        let version = self.get_version(version_id).await?;
        if version.status()? != VersionStatus::Draft {
            return Err(CoreError::Validation(
                "Only draft versions can be edited".into(),
            )
            .into());
        }
        let prepared = prepare_widgets(self.widget_types.as_ref(), widgets)?;

        let mut tx = self.pool.begin().await?;
        lock_page(&mut tx, version.page_id).await?;
        let updated = PageVersionRepo::replace_draft_widgets(&mut *tx, version_id, &prepared, user)
            .await?
            .ok_or_else(|| CoreError::Validation("Only draft versions can be edited".into()))?;
        tx.commit().await?;

        tracing::info!(
            page_id = version.page_id,
            version_id,
            widget_count = prepared.len(),
            user_id = ?user,
            "Draft widgets replaced"
        );
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Unit-of-work helpers
// ---------------------------------------------------------------------------

/// Snapshot the locked page into a new version inside `tx`.
///
/// Widgets are copied from the page's current version, or empty when it has
/// none.
pub(crate) async fn create_version_in(
    tx: &mut Tx<'_>,
    page: &Page,
    description: Option<String>,
    publish: bool,
    user: Option<DbId>,
) -> EngineResult<PageVersion> {
    let widgets = PageVersionRepo::find_current(&mut **tx, page.id)
        .await?
        .map(|v| v.widgets.0)
        .unwrap_or_default();
    let page_data: PageData = page.to_page_data()?;

    let version = PageVersionRepo::create(
        &mut **tx,
        &NewPageVersion {
            page_id: page.id,
            page_data,
            widgets,
            description,
            created_by: user,
        },
    )
    .await?;

    let version = if publish {
        make_current(tx, &version, user).await?
    } else {
        version
    };

    tracing::debug!(
        page_id = page.id,
        version_number = version.version_number,
        published = publish,
        "Version created"
    );
    Ok(version)
}

/// Clear the current flag on every other version, then publish this one.
async fn make_current(
    tx: &mut Tx<'_>,
    version: &PageVersion,
    user: Option<DbId>,
) -> EngineResult<PageVersion> {
    PageVersionRepo::clear_current(&mut **tx, version.page_id, version.id).await?;
    PageVersionRepo::mark_published(&mut **tx, version.id, user, Utc::now())
        .await?
        .ok_or_else(|| version_not_found(version.id))
}

fn summaries(versions: &[PageVersion]) -> Result<Vec<VersionSummary>, CoreError> {
    versions.iter().map(PageVersion::summary).collect()
}
