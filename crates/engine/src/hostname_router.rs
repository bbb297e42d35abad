//! HostnameRouter: request host -> site root page.

use serde::Serialize;
use sqlx::PgPool;
use trellis_core::error::CoreError;
use trellis_core::hostname::lookup_candidates;
use trellis_db::models::page::Page;
use trellis_db::repositories::PageRepo;

use crate::error::EngineResult;

/// The root page a request host routes to.
#[derive(Debug, Clone, Serialize)]
pub struct SiteMatch {
    /// The claim that matched: the exact host, the bare host, `*`, or `default`.
    pub matched_hostname: String,
    pub root: Page,
}

#[derive(Clone)]
pub struct HostnameRouter {
    pool: PgPool,
}

impl HostnameRouter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Route a raw `Host` value. Tries `host:port`, the bare host, `*`, then
    /// `default`.
    pub async fn resolve(&self, request_host: &str) -> EngineResult<SiteMatch> {
        let candidates = lookup_candidates(request_host);
        let found = PageRepo::find_root_by_hostnames(&self.pool, &candidates).await?;

        match found {
            Some(m) => {
                tracing::debug!(
                    request_host,
                    matched = %m.matched_hostname,
                    root_id = m.page.id,
                    "Hostname routed"
                );
                Ok(SiteMatch {
                    matched_hostname: m.matched_hostname,
                    root: m.page,
                })
            }
            None => Err(CoreError::RouteNotFound(format!("host '{request_host}'")).into()),
        }
    }
}
