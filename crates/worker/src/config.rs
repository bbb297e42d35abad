use std::time::Duration;

/// Default interval for both batch checks: one hour.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;

/// Scheduler configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// How often scheduled pages are checked for publication.
    pub publication_interval: Duration,
    /// How often published pages are checked for expiry.
    pub expiry_interval: Duration,
    /// Run both checks immediately instead of waiting one full interval.
    pub run_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            publication_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            expiry_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            run_on_start: true,
        }
    }
}

impl SchedulerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                           | Default |
    /// |-----------------------------------|---------|
    /// | `PUBLICATION_CHECK_INTERVAL_SECS` | `3600`  |
    /// | `EXPIRY_CHECK_INTERVAL_SECS`      | `3600`  |
    /// | `SCHEDULER_RUN_ON_START`          | `true`  |
    pub fn from_env() -> Self {
        let publication_secs = interval_secs(std::env::var("PUBLICATION_CHECK_INTERVAL_SECS").ok())
            .expect("PUBLICATION_CHECK_INTERVAL_SECS must be a positive integer");
        let expiry_secs = interval_secs(std::env::var("EXPIRY_CHECK_INTERVAL_SECS").ok())
            .expect("EXPIRY_CHECK_INTERVAL_SECS must be a positive integer");
        let run_on_start = flag(std::env::var("SCHEDULER_RUN_ON_START").ok(), true)
            .expect("SCHEDULER_RUN_ON_START must be true or false");

        Self {
            publication_interval: Duration::from_secs(publication_secs),
            expiry_interval: Duration::from_secs(expiry_secs),
            run_on_start,
        }
    }
}

/// Parse an interval in seconds; absent means the default, zero is rejected.
fn interval_secs(raw: Option<String>) -> Option<u64> {
    match raw {
        None => Some(DEFAULT_CHECK_INTERVAL_SECS),
        Some(v) => v.trim().parse().ok().filter(|secs| *secs > 0),
    }
}

fn flag(raw: Option<String>, default: bool) -> Option<bool> {
    match raw.as_deref().map(str::trim) {
        None => Some(default),
        Some("true" | "1" | "yes") => Some(true),
        Some("false" | "0" | "no") => Some(false),
        Some(_) => None,
    }
}
