//! Page version snapshots: the frozen scalar fields, the widget placement
//! list, version status, and the pure version queries.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::publication::PublicationStatus;
use crate::types::{DbId, Timestamp};

/// Version status. Discriminants match the `page_version_statuses` seed rows.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    Draft = 1,
    Published = 2,
    Archived = 3,
}

impl VersionStatus {
    /// Database status ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Draft),
            2 => Some(Self::Published),
            3 => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable copy of a page's scalar fields, taken when a version is created.
///
/// Hostnames are deliberately absent: they belong to the live site root,
/// not to a page's content history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    pub title: String,
    pub slug: String,
    pub parent_id: Option<DbId>,
    pub sort_order: i32,
    pub layout_key: Option<String>,
    pub theme_id: Option<DbId>,
    pub publication_status: PublicationStatus,
    pub effective_date: Option<Timestamp>,
    pub expiry_date: Option<Timestamp>,
    pub seo_title: Option<String>,
    pub meta_description: Option<String>,
    pub show_in_menus: bool,
}

impl PageData {
    /// Field-by-field view used by the version diff. Values are rendered as
    /// JSON so that absent and present fields compare uniformly.
    pub fn fields(&self) -> Vec<(&'static str, serde_json::Value)> {
        use serde_json::json;
        vec![
            ("title", json!(self.title)),
            ("slug", json!(self.slug)),
            ("parent_id", json!(self.parent_id)),
            ("sort_order", json!(self.sort_order)),
            ("layout_key", json!(self.layout_key)),
            ("theme_id", json!(self.theme_id)),
            ("publication_status", json!(self.publication_status)),
            ("effective_date", json!(self.effective_date)),
            ("expiry_date", json!(self.expiry_date)),
            ("seo_title", json!(self.seo_title)),
            ("meta_description", json!(self.meta_description)),
            ("show_in_menus", json!(self.show_in_menus)),
        ]
    }
}

/// One widget placed in a slot. Persisted as an element of the version's
/// `widgets` JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetRecord {
    pub id: String,
    pub slot: String,
    pub order: i32,
    pub type_key: String,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub inherit_from_parent: bool,
    #[serde(default)]
    pub override_parent: bool,
}

/// A page's widgets in one slot, sorted by `order`.
///
/// The sort is stable, so widgets sharing an `order` keep insertion order.
pub fn widgets_for_slot<'a>(widgets: &'a [WidgetRecord], slot: &str) -> Vec<&'a WidgetRecord> {
    let mut in_slot: Vec<&WidgetRecord> = widgets.iter().filter(|w| w.slot == slot).collect();
    in_slot.sort_by_key(|w| w.order);
    in_slot
}

/// Every slot name used by a widget list, sorted and deduplicated.
pub fn slot_names(widgets: &[WidgetRecord]) -> Vec<String> {
    let mut names: Vec<String> = widgets.iter().map(|w| w.slot.clone()).collect();
    names.sort();
    names.dedup();
    names
}

/// The status/number pair the version queries need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionSummary {
    pub version_number: i32,
    pub status: VersionStatus,
    pub is_current: bool,
}

/// The current version: published and flagged current.
pub fn current_version(versions: &[VersionSummary]) -> Option<&VersionSummary> {
    versions
        .iter()
        .find(|v| v.is_current && v.status == VersionStatus::Published)
}

/// Highest-numbered draft.
pub fn latest_draft(versions: &[VersionSummary]) -> Option<&VersionSummary> {
    versions
        .iter()
        .filter(|v| v.status == VersionStatus::Draft)
        .max_by_key(|v| v.version_number)
}

/// True when a draft exists and there is no current version, or when some
/// draft is newer than the current version.
pub fn has_unpublished_changes(versions: &[VersionSummary]) -> bool {
    let mut drafts = versions.iter().filter(|v| v.status == VersionStatus::Draft);
    match current_version(versions) {
        None => drafts.next().is_some(),
        Some(current) => drafts.any(|d| d.version_number > current.version_number),
    }
}

/// Check the at-most-one-current invariant over a page's versions.
pub fn check_current_invariant(versions: &[VersionSummary]) -> Result<(), CoreError> {
    let current: Vec<&VersionSummary> = versions.iter().filter(|v| v.is_current).collect();
    if current.len() > 1 {
        return Err(CoreError::Internal(format!(
            "{} versions are flagged current",
            current.len()
        )));
    }
    if let Some(v) = current.first() {
        if v.status != VersionStatus::Published {
            return Err(CoreError::Internal(format!(
                "Current version {} has status {}",
                v.version_number, v.status
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget(id: &str, slot: &str, order: i32) -> WidgetRecord {
        WidgetRecord {
            id: id.to_string(),
            slot: slot.to_string(),
            order,
            type_key: "rich_text".to_string(),
            config: json!({}),
            inherit_from_parent: false,
            override_parent: false,
        }
    }

    fn summary(n: i32, status: VersionStatus, is_current: bool) -> VersionSummary {
        VersionSummary {
            version_number: n,
            status,
            is_current,
        }
    }

    // -- widgets -------------------------------------------------------------

    #[test]
    fn slot_filter_sorts_by_order_and_keeps_ties_stable() {
        let widgets = vec![
            widget("c", "main", 2),
            widget("x", "aside", 0),
            widget("a", "main", 1),
            widget("b", "main", 1),
        ];
        let ids: Vec<&str> = widgets_for_slot(&widgets, "main")
            .iter()
            .map(|w| w.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn slot_names_dedup() {
        let widgets = vec![widget("a", "main", 0), widget("b", "aside", 0), widget("c", "main", 1)];
        assert_eq!(slot_names(&widgets), vec!["aside", "main"]);
    }

    #[test]
    fn widget_flags_default_to_false_when_absent() {
        let w: WidgetRecord = serde_json::from_value(json!({
            "id": "w1", "slot": "main", "order": 0, "type_key": "html"
        }))
        .unwrap();
        assert!(!w.inherit_from_parent);
        assert!(!w.override_parent);
        assert!(w.config.is_null());
    }

    // -- queries -------------------------------------------------------------

    #[test]
    fn current_requires_published_status() {
        let versions = [summary(1, VersionStatus::Draft, true)];
        assert!(current_version(&versions).is_none());
    }

    #[test]
    fn latest_draft_is_highest_number() {
        let versions = [
            summary(1, VersionStatus::Draft, false),
            summary(2, VersionStatus::Published, true),
            summary(3, VersionStatus::Draft, false),
        ];
        assert_eq!(latest_draft(&versions).unwrap().version_number, 3);
    }

    #[test]
    fn unpublished_changes_without_current() {
        assert!(has_unpublished_changes(&[summary(1, VersionStatus::Draft, false)]));
        assert!(!has_unpublished_changes(&[]));
    }

    #[test]
    fn unpublished_changes_only_for_newer_drafts() {
        let older_draft = [
            summary(1, VersionStatus::Draft, false),
            summary(2, VersionStatus::Published, true),
        ];
        assert!(!has_unpublished_changes(&older_draft));

        let newer_draft = [
            summary(1, VersionStatus::Published, true),
            summary(2, VersionStatus::Draft, false),
        ];
        assert!(has_unpublished_changes(&newer_draft));
    }

    #[test]
    fn current_invariant_detects_two_current() {
        let versions = [
            summary(1, VersionStatus::Published, true),
            summary(2, VersionStatus::Published, true),
        ];
        assert!(check_current_invariant(&versions).is_err());
        assert!(check_current_invariant(&versions[..1]).is_ok());
    }
}
