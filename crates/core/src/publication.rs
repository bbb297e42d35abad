//! Publication status, the transition table, visibility predicates, and the
//! pure transition planners used by the engine.
//!
//! The planners compute *what* a page's publication fields become; the engine
//! applies the result inside a transaction and records a version.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Page publication status. Discriminants match the seed rows of the
/// `page_publication_statuses` lookup table.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    Unpublished = 1,
    Scheduled = 2,
    Published = 3,
    Expired = 4,
}

impl PublicationStatus {
    /// Database status ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Unpublished),
            2 => Some(Self::Scheduled),
            3 => Some(Self::Published),
            4 => Some(Self::Expired),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unpublished => "unpublished",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Transition table for page publication.
///
/// There is no terminal state. Every state can be re-scheduled or taken
/// offline; `published` is entered from anywhere except itself, and
/// `expired` only from `published`.
pub mod state_machine {
    use super::PublicationStatus::{self, *};

    /// Returns the set of statuses reachable from `from`.
    pub fn valid_transitions(from: PublicationStatus) -> &'static [PublicationStatus] {
        match from {
            Unpublished => &[Scheduled, Published, Unpublished],
            Scheduled => &[Published, Scheduled, Unpublished],
            Published => &[Expired, Scheduled, Unpublished],
            Expired => &[Published, Scheduled, Unpublished],
        }
    }

    pub fn can_transition(from: PublicationStatus, to: PublicationStatus) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a transition, returning a descriptive message for invalid ones.
    pub fn validate_transition(from: PublicationStatus, to: PublicationStatus) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!("Invalid transition: {from} -> {to}"))
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// The `(effective_date, expiry_date)` pair governing public visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schedule {
    pub effective_date: Option<Timestamp>,
    pub expiry_date: Option<Timestamp>,
}

impl Schedule {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_date_order(self.effective_date, self.expiry_date)
    }
}

/// `effective_date` must be strictly before `expiry_date` when both are set.
pub fn validate_date_order(
    effective_date: Option<Timestamp>,
    expiry_date: Option<Timestamp>,
) -> Result<(), CoreError> {
    if let (Some(effective), Some(expiry)) = (effective_date, expiry_date) {
        if effective >= expiry {
            return Err(CoreError::Validation(format!(
                "Effective date ({effective}) must be before expiry date ({expiry})"
            )));
        }
    }
    Ok(())
}

/// The publication fields of a page, as read or as they will be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublicationState {
    pub status: PublicationStatus,
    pub effective_date: Option<Timestamp>,
    pub expiry_date: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Visibility predicates
// ---------------------------------------------------------------------------

/// Published and inside its schedule window.
pub fn is_published(state: &PublicationState, now: Timestamp) -> bool {
    state.status == PublicationStatus::Published
        && state.effective_date.map_or(true, |d| d <= now)
        && state.expiry_date.map_or(true, |d| d > now)
}

/// Scheduled, effective date reached, and not already past expiry.
pub fn should_be_published_now(state: &PublicationState, now: Timestamp) -> bool {
    state.status == PublicationStatus::Scheduled
        && state.effective_date.is_some_and(|d| d <= now)
        && state.expiry_date.map_or(true, |d| d > now)
}

/// Published with an expiry date that has passed.
pub fn should_be_expired_now(state: &PublicationState, now: Timestamp) -> bool {
    state.status == PublicationStatus::Published && state.expiry_date.is_some_and(|d| d <= now)
}

// ---------------------------------------------------------------------------
// Transition planners
// ---------------------------------------------------------------------------

/// Publish: `None` when the page is already published (a no-op).
///
/// Dates are left as they are; the batch runner publishes scheduled pages
/// whose window is already set.
pub fn plan_publish(current: &PublicationState) -> Option<PublicationState> {
    if current.status == PublicationStatus::Published
        || !state_machine::can_transition(current.status, PublicationStatus::Published)
    {
        return None;
    }
    Some(PublicationState {
        status: PublicationStatus::Published,
        ..*current
    })
}

/// Expire: `None` unless the page is currently published.
pub fn plan_expire(current: &PublicationState) -> Option<PublicationState> {
    if current.status != PublicationStatus::Published {
        return None;
    }
    Some(PublicationState {
        status: PublicationStatus::Expired,
        ..*current
    })
}

/// Schedule: overwrites status and both dates once the pair is validated.
pub fn plan_schedule(schedule: &Schedule) -> Result<PublicationState, CoreError> {
    schedule.validate()?;
    Ok(PublicationState {
        status: PublicationStatus::Scheduled,
        effective_date: schedule.effective_date,
        expiry_date: schedule.expiry_date,
    })
}

/// Unpublish: clears the effective date and stamps `expiry_date = now`
/// unless an expiry is already set.
pub fn plan_unpublish(current: &PublicationState, now: Timestamp) -> PublicationState {
    PublicationState {
        status: PublicationStatus::Unpublished,
        effective_date: None,
        expiry_date: current.expiry_date.or(Some(now)),
    }
}

/// Result of the publish-with-date rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishNowPlan {
    /// Publish immediately with `effective_date = now`, expiry cleared.
    Publish(PublicationState),
    /// Requested date is in the future; schedule instead.
    Schedule(PublicationState),
    /// Requested date is in the past; degrade to unpublishing.
    Unpublish(PublicationState),
}

impl PublishNowPlan {
    pub fn target(&self) -> &PublicationState {
        match self {
            Self::Publish(s) | Self::Schedule(s) | Self::Unpublish(s) => s,
        }
    }

    pub fn outcome(&self) -> PublishNowOutcome {
        match self {
            Self::Publish(_) => PublishNowOutcome::Published,
            Self::Schedule(_) => PublishNowOutcome::Scheduled,
            Self::Unpublish(_) => PublishNowOutcome::Unpublished,
        }
    }
}

/// What the publish-with-date rule did to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishNowOutcome {
    Published,
    Scheduled,
    Unpublished,
}

/// The "publish now" rule for a requested effective date.
///
/// A date equal to `now` counts as "now" and publishes immediately. A stale
/// date never back-dates a publish: the page is taken offline instead.
pub fn plan_publish_with_date(
    current: &PublicationState,
    requested: Option<Timestamp>,
    now: Timestamp,
) -> Result<PublishNowPlan, CoreError> {
    match requested {
        None => Ok(PublishNowPlan::Publish(PublicationState {
            status: PublicationStatus::Published,
            effective_date: Some(now),
            expiry_date: None,
        })),
        Some(date) if date > now => {
            // A lapsed expiry (e.g. the one stamped by unpublish) is dropped.
            let schedule = Schedule {
                effective_date: Some(date),
                expiry_date: current.expiry_date.filter(|expiry| *expiry > now),
            };
            plan_schedule(&schedule).map(PublishNowPlan::Schedule)
        }
        Some(date) if date == now => Ok(PublishNowPlan::Publish(PublicationState {
            status: PublicationStatus::Published,
            effective_date: Some(now),
            expiry_date: None,
        })),
        Some(_) => Ok(PublishNowPlan::Unpublish(plan_unpublish(current, now))),
    }
}
