//! Layout, theme, and widget-slot inheritance over a page chain.
//!
//! The chain is the target page followed by its ancestors, nearest first.
//! Each link carries the widgets of that page's *current* version (empty when
//! the page has never been published).
//!
//! - Layout and theme: the first link whose value is set *and* known to the
//!   registry wins. Unknown keys are logged and skipped.
//! - Widgets: accumulate across the whole chain. The target page contributes
//!   all of its slot widgets, where an `override_parent` widget resets what
//!   the target has contributed so far. Ancestors contribute only widgets
//!   flagged `inherit_from_parent`. Ancestors are still walked after a target
//!   override.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::CoreError;
use crate::registry::{LayoutDescriptor, LayoutRegistry, ThemeDescriptor, ThemeRegistry};
use crate::types::DbId;
use crate::versioning::{slot_names, widgets_for_slot, WidgetRecord};

/// One page of a resolution chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLink {
    pub page_id: DbId,
    pub layout_key: Option<String>,
    pub theme_id: Option<DbId>,
    pub widgets: Vec<WidgetRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLayout {
    /// Page whose `layout_key` supplied the layout.
    pub source_page_id: DbId,
    pub layout: LayoutDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTheme {
    pub source_page_id: DbId,
    pub theme: ThemeDescriptor,
}

/// A widget in a resolved slot, tagged with the page it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedWidget {
    pub source_page_id: DbId,
    pub inherited: bool,
    #[serde(flatten)]
    pub widget: WidgetRecord,
}

/// Everything the renderer needs for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPage {
    pub page_id: DbId,
    pub layout: Option<ResolvedLayout>,
    pub theme: Option<ResolvedTheme>,
    pub slots: BTreeMap<String, Vec<ResolvedWidget>>,
}

/// Widget-slot resolution for one slot.
pub fn resolve_slot(chain: &[ChainLink], slot: &str) -> Vec<ResolvedWidget> {
    let mut result: Vec<ResolvedWidget> = Vec::new();

    for (depth, link) in chain.iter().enumerate() {
        let own = widgets_for_slot(&link.widgets, slot);
        if depth == 0 {
            for widget in own {
                let resolved = ResolvedWidget {
                    source_page_id: link.page_id,
                    inherited: false,
                    widget: widget.clone(),
                };
                if widget.override_parent {
                    result.clear();
                }
                result.push(resolved);
            }
        } else {
            result.extend(own.into_iter().filter(|w| w.inherit_from_parent).map(|w| {
                ResolvedWidget {
                    source_page_id: link.page_id,
                    inherited: true,
                    widget: w.clone(),
                }
            }));
        }
    }

    result
}

/// Resolves layouts, themes, and slots against injected registries.
#[derive(Clone)]
pub struct InheritanceResolver {
    layouts: Arc<dyn LayoutRegistry>,
    themes: Arc<dyn ThemeRegistry>,
}

impl InheritanceResolver {
    pub fn new(layouts: Arc<dyn LayoutRegistry>, themes: Arc<dyn ThemeRegistry>) -> Self {
        Self { layouts, themes }
    }

    /// Nearest layout in the chain that the registry knows about.
    pub async fn resolve_layout(
        &self,
        chain: &[ChainLink],
    ) -> Result<Option<ResolvedLayout>, CoreError> {
        for link in chain {
            let Some(key) = link.layout_key.as_deref().filter(|k| !k.is_empty()) else {
                continue;
            };
            match self.layouts.lookup(key).await? {
                Some(layout) => {
                    return Ok(Some(ResolvedLayout {
                        source_page_id: link.page_id,
                        layout,
                    }))
                }
                None => {
                    tracing::warn!(
                        page_id = link.page_id,
                        layout_key = key,
                        "Layout not registered, falling back to parent"
                    );
                }
            }
        }
        Ok(None)
    }

    /// Nearest theme in the chain that the registry knows about.
    pub async fn resolve_theme(
        &self,
        chain: &[ChainLink],
    ) -> Result<Option<ResolvedTheme>, CoreError> {
        for link in chain {
            let Some(theme_id) = link.theme_id else {
                continue;
            };
            match self.themes.get(theme_id).await? {
                Some(theme) => {
                    return Ok(Some(ResolvedTheme {
                        source_page_id: link.page_id,
                        theme,
                    }))
                }
                None => {
                    tracing::warn!(
                        page_id = link.page_id,
                        theme_id,
                        "Theme not registered, falling back to parent"
                    );
                }
            }
        }
        Ok(None)
    }

    /// Resolve layout, theme, and every slot for the chain's target page.
    ///
    /// Slots are the layout's declared slots plus any slot name used by a
    /// widget anywhere in the chain.
    pub async fn resolve(&self, chain: &[ChainLink]) -> Result<ResolvedPage, CoreError> {
        let target = chain
            .first()
            .ok_or_else(|| CoreError::Internal("Cannot resolve an empty page chain".into()))?;

        let layout = self.resolve_layout(chain).await?;
        let theme = self.resolve_theme(chain).await?;

        let mut names: Vec<String> = layout
            .as_ref()
            .map(|l| l.layout.slots.clone())
            .unwrap_or_default();
        for link in chain {
            names.extend(slot_names(&link.widgets));
        }
        names.sort();
        names.dedup();

        let slots = names
            .into_iter()
            .map(|name| {
                let widgets = resolve_slot(chain, &name);
                (name, widgets)
            })
            .collect();

        Ok(ResolvedPage {
            page_id: target.page_id,
            layout,
            theme,
            slots,
        })
    }
}
