//! PublicationStateMachine: status transitions on a page and the batch
//! entrypoints the scheduler drives.
//!
//! `publish` and `expire` follow a tell-don't-ask contract: ordinary
//! rejections come back as `Ok(false)` with a log entry, and only storage
//! failures escape as errors.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use trellis_core::batch::{run_batch, BatchItemError, BatchReport};
use trellis_core::error::CoreError;
use trellis_core::publication::{
    plan_expire, plan_publish, plan_publish_with_date, plan_schedule, plan_unpublish,
    should_be_expired_now, should_be_published_now, state_machine, PublicationState,
    PublishNowOutcome, PublishNowPlan, Schedule,
};
use trellis_core::types::{DbId, Timestamp};
use trellis_db::models::page::Page;
use trellis_db::repositories::PageRepo;

use crate::error::{page_not_found, EngineError, EngineResult};
use crate::hierarchy::lock_page;
use crate::versions::create_version_in;
use crate::Tx;

/// Result of the publish-with-date rule for one page.
#[derive(Debug, Clone, Serialize)]
pub struct PublishNowResult {
    pub outcome: PublishNowOutcome,
    pub page: Page,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkPublishItem {
    pub page_id: DbId,
    pub outcome: PublishNowOutcome,
}

/// Per-page outcomes of a bulk publish; failures do not stop the batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkPublishReport {
    pub results: Vec<BulkPublishItem>,
    pub errors: Vec<BatchItemError>,
}

#[derive(Clone)]
pub struct PublicationStateMachine {
    pool: PgPool,
}

impl PublicationStateMachine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Publish a page and make a new published version current.
    ///
    /// Returns `Ok(false)` when the page is already published or the
    /// transition is rejected.
    pub async fn publish(&self, page_id: DbId, user: Option<DbId>) -> EngineResult<bool> {
        swallow_rejection(page_id, "publish", self.try_publish(page_id, user, None).await)
    }

    /// Expire a published page, recording a draft version.
    ///
    /// Returns `Ok(false)` when the page is not currently published.
    pub async fn expire(&self, page_id: DbId, user: Option<DbId>) -> EngineResult<bool> {
        swallow_rejection(page_id, "expire", self.try_expire(page_id, user, None).await)
    }

    /// Overwrite status and both dates with a validated schedule.
    pub async fn schedule(
        &self,
        page_id: DbId,
        schedule: Schedule,
        user: Option<DbId>,
    ) -> EngineResult<Page> {
        let target = plan_schedule(&schedule)?;

        let mut tx = self.pool.begin().await?;
        let page = lock_page(&mut tx, page_id).await?;
        let current = page.publication_state()?;
        let page =
            apply_transition(&mut tx, page_id, &current, &target, false, user, "Scheduled").await?;
        tx.commit().await?;

        tracing::info!(
            page_id,
            effective_date = ?target.effective_date,
            expiry_date = ?target.expiry_date,
            "Page scheduled"
        );
        Ok(page)
    }

    /// Take a page offline: clears the effective date and stamps the expiry
    /// with now unless one is already set.
    pub async fn unpublish(&self, page_id: DbId, user: Option<DbId>) -> EngineResult<Page> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let page = lock_page(&mut tx, page_id).await?;
        let current = page.publication_state()?;
        let target = plan_unpublish(&current, now);
        let page =
            apply_transition(&mut tx, page_id, &current, &target, false, user, "Unpublished").await?;
        tx.commit().await?;

        tracing::info!(page_id, "Page unpublished");
        Ok(page)
    }

    /// The "publish now" entrypoint.
    ///
    /// No date publishes immediately, a future date schedules, and a past
    /// date unpublishes.
    pub async fn publish_with_date(
        &self,
        page_id: DbId,
        requested: Option<Timestamp>,
        user: Option<DbId>,
    ) -> EngineResult<PublishNowResult> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let page = lock_page(&mut tx, page_id).await?;
        let current = page.publication_state()?;
        let plan = plan_publish_with_date(&current, requested, now)?;

        let publish = matches!(plan, PublishNowPlan::Publish(_));
        let description = match plan {
            PublishNowPlan::Publish(_) => "Published",
            PublishNowPlan::Schedule(_) => "Scheduled",
            PublishNowPlan::Unpublish(_) => "Unpublished",
        };
        let page = apply_transition(
            &mut tx,
            page_id,
            &current,
            plan.target(),
            publish,
            user,
            description,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(page_id, outcome = ?plan.outcome(), "Publish-now applied");
        Ok(PublishNowResult {
            outcome: plan.outcome(),
            page,
        })
    }

    /// Apply the publish-with-date rule to each page in its own transaction.
    pub async fn publish_bulk(
        &self,
        page_ids: &[DbId],
        requested: Option<Timestamp>,
        user: Option<DbId>,
    ) -> BulkPublishReport {
        let mut report = BulkPublishReport::default();

        for &page_id in page_ids {
            match self.publish_with_date(page_id, requested, user).await {
                Ok(result) => report.results.push(BulkPublishItem {
                    page_id,
                    outcome: result.outcome,
                }),
                Err(e) => {
                    tracing::warn!(page_id, error = %e, "Bulk publish item failed");
                    report.errors.push(BatchItemError {
                        page_id,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            requested = page_ids.len(),
            succeeded = report.results.len(),
            failed = report.errors.len(),
            "Bulk publish finished"
        );
        report
    }

    // -----------------------------------------------------------------------
    // Batch entrypoints
    // -----------------------------------------------------------------------

    /// Publish every scheduled page whose window has opened at `now`.
    pub async fn process_scheduled_publications(&self, now: Timestamp) -> BatchReport {
        let candidates = match PageRepo::list_due_for_publication(&self.pool, now).await {
            Ok(ids) => ids,
            Err(e) => return candidate_query_failed("scheduled_publications", e),
        };
        if candidates.is_empty() {
            tracing::debug!("No scheduled pages due for publication");
            return BatchReport::default();
        }

        let report = run_batch("scheduled_publications", candidates, |page_id| {
            self.try_publish(page_id, None, Some(now))
        })
        .await;

        tracing::info!(
            published = report.processed,
            skipped = report.skipped,
            errors = report.errors.len(),
            "Scheduled publications processed"
        );
        report
    }

    /// Expire every published page whose expiry date has passed at `now`.
    pub async fn process_expired_pages(&self, now: Timestamp) -> BatchReport {
        let candidates = match PageRepo::list_due_for_expiry(&self.pool, now).await {
            Ok(ids) => ids,
            Err(e) => return candidate_query_failed("expired_pages", e),
        };
        if candidates.is_empty() {
            tracing::debug!("No published pages due for expiry");
            return BatchReport::default();
        }

        let report = run_batch("expired_pages", candidates, |page_id| {
            self.try_expire(page_id, None, Some(now))
        })
        .await;

        tracing::info!(
            expired = report.processed,
            skipped = report.skipped,
            errors = report.errors.len(),
            "Expired pages processed"
        );
        report
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Publish without swallowing rejections. With `due_at`, the page is
    /// re-checked under its row lock and skipped if no longer due.
    async fn try_publish(
        &self,
        page_id: DbId,
        user: Option<DbId>,
        due_at: Option<Timestamp>,
    ) -> EngineResult<bool> {
        let mut tx = self.pool.begin().await?;
        let page = lock_page(&mut tx, page_id).await?;
        let current = page.publication_state()?;

        if let Some(now) = due_at {
            if !should_be_published_now(&current, now) {
                tracing::debug!(page_id, "Page no longer due for publication");
                return Ok(false);
            }
        }
        let Some(target) = plan_publish(&current) else {
            tracing::debug!(page_id, "Page already published");
            return Ok(false);
        };

        apply_transition(&mut tx, page_id, &current, &target, true, user, "Published").await?;
        tx.commit().await?;

        tracing::info!(page_id, from = %current.status, "Page published");
        Ok(true)
    }

    async fn try_expire(
        &self,
        page_id: DbId,
        user: Option<DbId>,
        due_at: Option<Timestamp>,
    ) -> EngineResult<bool> {
        let mut tx = self.pool.begin().await?;
        let page = lock_page(&mut tx, page_id).await?;
        let current = page.publication_state()?;

        if let Some(now) = due_at {
            if !should_be_expired_now(&current, now) {
                tracing::debug!(page_id, "Page no longer due for expiry");
                return Ok(false);
            }
        }
        let Some(target) = plan_expire(&current) else {
            tracing::debug!(page_id, status = %current.status, "Page not published, nothing to expire");
            return Ok(false);
        };

        apply_transition(&mut tx, page_id, &current, &target, false, user, "Expired").await?;
        tx.commit().await?;

        tracing::info!(page_id, "Page expired");
        Ok(true)
    }
}

/// Write the target state and record a version of it inside `tx`.
///
/// `publish_version` makes the new version the current published one;
/// otherwise it is recorded as a draft. Re-entering the same status is a
/// refresh and skips the transition table.
async fn apply_transition(
    tx: &mut Tx<'_>,
    page_id: DbId,
    current: &PublicationState,
    target: &PublicationState,
    publish_version: bool,
    user: Option<DbId>,
    description: &str,
) -> EngineResult<Page> {
    if target.status != current.status {
        state_machine::validate_transition(current.status, target.status)
            .map_err(CoreError::Validation)?;
    }

    let page = PageRepo::set_publication_state(&mut **tx, page_id, target, user)
        .await?
        .ok_or_else(|| page_not_found(page_id))?;
    create_version_in(tx, &page, Some(description.to_string()), publish_version, user).await?;

    Ok(page)
}

fn swallow_rejection(
    page_id: DbId,
    operation: &str,
    result: EngineResult<bool>,
) -> EngineResult<bool> {
    match result {
        Err(EngineError::Core(e)) => {
            tracing::warn!(page_id, operation, error = %e, "Transition rejected");
            Ok(false)
        }
        other => other,
    }
}

fn candidate_query_failed(job: &str, e: sqlx::Error) -> BatchReport {
    tracing::error!(job, error = %e, "Failed to list batch candidates");
    BatchReport {
        errors: vec![BatchItemError {
            page_id: 0,
            message: format!("Failed to list candidates: {e}"),
        }],
        ..Default::default()
    }
}
