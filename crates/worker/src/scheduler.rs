//! Publication scheduler.
//!
//! [`PublicationScheduler`] runs as a background task, periodically
//! publishing scheduled pages whose window has opened and expiring published
//! pages whose expiry date has passed. Each check is one batch run; failed
//! pages are logged and picked up again on the next tick.

use chrono::Utc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use trellis_core::batch::BatchReport;
use trellis_engine::PublicationStateMachine;

use crate::config::SchedulerConfig;

// ---------------------------------------------------------------------------
// PublicationScheduler
// ---------------------------------------------------------------------------

pub struct PublicationScheduler {
    publication: PublicationStateMachine,
    config: SchedulerConfig,
}

impl PublicationScheduler {
    pub fn new(publication: PublicationStateMachine, config: SchedulerConfig) -> Self {
        Self {
            publication,
            config,
        }
    }

    /// Run both checks until `cancel` is triggered.
    ///
    /// With `run_on_start`, the first tick of each check fires immediately.
    pub async fn run(&self, cancel: CancellationToken) {
        let start = if self.config.run_on_start {
            Instant::now()
        } else {
            Instant::now() + self.config.publication_interval.min(self.config.expiry_interval)
        };
        let mut publish_tick = interval_at(start, self.config.publication_interval);
        let mut expiry_tick = interval_at(start, self.config.expiry_interval);
        publish_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        expiry_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            publication_interval_secs = self.config.publication_interval.as_secs(),
            expiry_interval_secs = self.config.expiry_interval.as_secs(),
            run_on_start = self.config.run_on_start,
            "Publication scheduler started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Publication scheduler cancelled");
                    break;
                }
                _ = publish_tick.tick() => {
                    self.check_scheduled_publications().await;
                }
                _ = expiry_tick.tick() => {
                    self.check_expired_pages().await;
                }
            }
        }
    }

    /// One pass of the publication check at the current time.
    pub async fn check_scheduled_publications(&self) -> BatchReport {
        let report = self
            .publication
            .process_scheduled_publications(Utc::now())
            .await;
        log_report("scheduled_publications", &report);
        report
    }

    /// One pass of the expiry check at the current time.
    pub async fn check_expired_pages(&self) -> BatchReport {
        let report = self.publication.process_expired_pages(Utc::now()).await;
        log_report("expired_pages", &report);
        report
    }
}

fn log_report(job: &str, report: &BatchReport) {
    if !report.is_clean() {
        for item in &report.errors {
            tracing::error!(
                job,
                page_id = item.page_id,
                error = %item.message,
                "Page failed in batch"
            );
        }
        tracing::warn!(
            job,
            processed = report.processed,
            failed = report.errors.len(),
            "Batch finished with failures"
        );
    } else if report.total() == 0 {
        tracing::debug!(job, "Nothing due");
    }
}
