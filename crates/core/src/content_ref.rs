//! Typed references from widget configs to other content.
//!
//! A widget config may carry `"object_ref": {"kind": "page", "id": 42}`. At
//! resolution time the reference is expanded by the transform registered for
//! its kind and the result stored next to it under `"object"`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::inheritance::ResolvedPage;
use crate::types::DbId;

/// Config key holding the reference.
pub const OBJECT_REF_KEY: &str = "object_ref";

/// Config key the expanded object is written to.
pub const EXPANDED_KEY: &str = "object";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Page,
    Media,
    Form,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Media => "media",
            Self::Form => "form",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub id: DbId,
}

impl ObjectRef {
    /// The reference in a widget config, if present and well formed.
    pub fn from_config(config: &Value) -> Option<Self> {
        config
            .get(OBJECT_REF_KEY)
            .and_then(|raw| serde_json::from_value(raw.clone()).ok())
    }
}

/// Turns a referenced object into the JSON a renderer receives.
#[async_trait]
pub trait ContentTransform: Send + Sync {
    /// `Ok(None)` when the referenced object does not exist.
    async fn transform(&self, id: DbId) -> Result<Option<Value>, CoreError>;
}

/// `kind -> transform` strategy map.
#[derive(Default, Clone)]
pub struct TransformRegistry {
    transforms: HashMap<ObjectKind, Arc<dyn ContentTransform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, kind: ObjectKind, transform: Arc<dyn ContentTransform>) -> Self {
        self.transforms.insert(kind, transform);
        self
    }

    /// Expand one reference. `Ok(None)` when no transform is registered for
    /// the kind or the target is missing.
    pub async fn expand(&self, object_ref: ObjectRef) -> Result<Option<Value>, CoreError> {
        let Some(transform) = self.transforms.get(&object_ref.kind) else {
            tracing::debug!(
                kind = object_ref.kind.as_str(),
                id = object_ref.id,
                "No content transform registered, leaving reference unexpanded"
            );
            return Ok(None);
        };
        transform.transform(object_ref.id).await
    }

    /// Expand the reference inside one widget config in place.
    pub async fn expand_config(&self, config: &mut Value) -> Result<(), CoreError> {
        let Some(object_ref) = ObjectRef::from_config(config) else {
            return Ok(());
        };
        let Some(expanded) = self.expand(object_ref).await? else {
            return Ok(());
        };
        if let Some(obj) = config.as_object_mut() {
            obj.insert(EXPANDED_KEY.to_string(), expanded);
        }
        Ok(())
    }

    /// Expand references in every widget of a resolved page.
    pub async fn expand_page(&self, page: &mut ResolvedPage) -> Result<(), CoreError> {
        for widgets in page.slots.values_mut() {
            for resolved in widgets.iter_mut() {
                self.expand_config(&mut resolved.widget.config).await?;
            }
        }
        Ok(())
    }
}
