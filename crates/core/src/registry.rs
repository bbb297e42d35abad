//! Layout and theme registries.
//!
//! Both are external collaborators injected into the resolver as
//! `Arc<dyn ...>`. The static variants here back tests and single-tenant
//! setups; the database-backed ones live in `trellis-db`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// A registered page layout and the slots it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    pub key: String,
    pub name: String,
    pub slots: Vec<String>,
    pub is_active: bool,
}

/// A registered theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeDescriptor {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub tokens: serde_json::Value,
}

#[async_trait]
pub trait LayoutRegistry: Send + Sync {
    /// Look up an active layout by key.
    async fn lookup(&self, key: &str) -> Result<Option<LayoutDescriptor>, CoreError>;

    /// Every active layout, ordered by key.
    async fn list_active(&self) -> Result<Vec<LayoutDescriptor>, CoreError>;
}

#[async_trait]
pub trait ThemeRegistry: Send + Sync {
    /// `None` for an unknown id; resolution skips to the next ancestor.
    async fn get(&self, id: DbId) -> Result<Option<ThemeDescriptor>, CoreError>;
}

// ---------------------------------------------------------------------------
// In-memory registries
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct StaticLayoutRegistry {
    layouts: HashMap<String, LayoutDescriptor>,
}

impl StaticLayoutRegistry {
    pub fn new(layouts: impl IntoIterator<Item = LayoutDescriptor>) -> Self {
        Self {
            layouts: layouts.into_iter().map(|l| (l.key.clone(), l)).collect(),
        }
    }
}

#[async_trait]
impl LayoutRegistry for StaticLayoutRegistry {
    async fn lookup(&self, key: &str) -> Result<Option<LayoutDescriptor>, CoreError> {
        Ok(self.layouts.get(key).filter(|l| l.is_active).cloned())
    }

    async fn list_active(&self) -> Result<Vec<LayoutDescriptor>, CoreError> {
        let mut active: Vec<LayoutDescriptor> =
            self.layouts.values().filter(|l| l.is_active).cloned().collect();
        active.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(active)
    }
}

#[derive(Debug, Default, Clone)]
pub struct StaticThemeRegistry {
    themes: HashMap<DbId, ThemeDescriptor>,
}

impl StaticThemeRegistry {
    pub fn new(themes: impl IntoIterator<Item = ThemeDescriptor>) -> Self {
        Self {
            themes: themes.into_iter().map(|t| (t.id, t)).collect(),
        }
    }
}

#[async_trait]
impl ThemeRegistry for StaticThemeRegistry {
    async fn get(&self, id: DbId) -> Result<Option<ThemeDescriptor>, CoreError> {
        Ok(self.themes.get(&id).cloned())
    }
}
