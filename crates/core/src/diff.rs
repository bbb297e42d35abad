//! Version comparison: scalar field changes plus a widget diff keyed by
//! `(slot, order)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::versioning::{PageData, WidgetRecord};

/// The status of an item in a diff comparison.
///
/// For widgets, the left-hand version is the reference: a key present only
/// on the left is `Added`, only on the right is `Removed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One differing scalar field. `old` is the left-hand value, `new` the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: serde_json::Value,
    pub new: serde_json::Value,
}

/// One differing widget position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetChange {
    pub slot: String,
    pub order: i32,
    pub status: DiffStatus,
    pub left: Option<WidgetRecord>,
    pub right: Option<WidgetRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotDiff {
    pub fields: Vec<FieldChange>,
    pub widgets: Vec<WidgetChange>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.widgets.is_empty()
    }
}

/// Compare two snapshots.
///
/// Widgets are matched on `(slot, order)`. Reordering widgets without
/// changing them therefore reports added/removed pairs rather than a move,
/// and when two widgets share a key the later one in the list wins.
pub fn compare_snapshots(
    left_data: &PageData,
    left_widgets: &[WidgetRecord],
    right_data: &PageData,
    right_widgets: &[WidgetRecord],
) -> SnapshotDiff {
    let fields = left_data
        .fields()
        .into_iter()
        .zip(right_data.fields())
        .filter(|((_, old), (_, new))| old != new)
        .map(|((field, old), (_, new))| FieldChange { field, old, new })
        .collect();

    let left = key_widgets(left_widgets);
    let right = key_widgets(right_widgets);

    let mut widgets = Vec::new();
    for (key, l) in &left {
        match right.get(key) {
            None => widgets.push(WidgetChange {
                slot: key.0.clone(),
                order: key.1,
                status: DiffStatus::Added,
                left: Some((*l).clone()),
                right: None,
            }),
            Some(r) if r != l => widgets.push(WidgetChange {
                slot: key.0.clone(),
                order: key.1,
                status: DiffStatus::Modified,
                left: Some((*l).clone()),
                right: Some((*r).clone()),
            }),
            Some(_) => {}
        }
    }
    for (key, r) in &right {
        if !left.contains_key(key) {
            widgets.push(WidgetChange {
                slot: key.0.clone(),
                order: key.1,
                status: DiffStatus::Removed,
                left: None,
                right: Some((*r).clone()),
            });
        }
    }
    widgets.sort_by(|a, b| (&a.slot, a.order).cmp(&(&b.slot, b.order)));

    SnapshotDiff { fields, widgets }
}

fn key_widgets(widgets: &[WidgetRecord]) -> BTreeMap<(String, i32), &WidgetRecord> {
    widgets
        .iter()
        .map(|w| ((w.slot.clone(), w.order), w))
        .collect()
}
