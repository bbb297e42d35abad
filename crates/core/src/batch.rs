//! Partial-failure batch runner used by the scheduler entrypoints.
//!
//! Each item is processed on its own. A failing item is recorded and the
//! batch carries on; nothing already processed is rolled back.

use std::fmt::Display;
use std::future::Future;

use serde::Serialize;

use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItemError {
    pub page_id: DbId,
    pub message: String,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Items whose transition was applied.
    pub processed: usize,
    /// Items that were no longer due once re-checked.
    pub skipped: usize,
    pub errors: Vec<BatchItemError>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run `op` for every id. `Ok(true)` counts as processed, `Ok(false)` as
/// skipped, and `Err` is logged and recorded against the id.
pub async fn run_batch<I, F, Fut, E>(job: &str, ids: I, mut op: F) -> BatchReport
where
    I: IntoIterator<Item = DbId>,
    F: FnMut(DbId) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: Display,
{
    let mut report = BatchReport::default();

    for page_id in ids {
        match op(page_id).await {
            Ok(true) => report.processed += 1,
            Ok(false) => report.skipped += 1,
            Err(e) => {
                tracing::error!(job, page_id, error = %e, "Batch item failed");
                report.errors.push(BatchItemError {
                    page_id,
                    message: e.to_string(),
                });
            }
        }
    }

    report
}
