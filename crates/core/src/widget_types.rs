//! Widget-type registry and config validation.
//!
//! Widget configs stay untyped JSON at the engine boundary. Each registered
//! type supplies its own `validate` and `defaults`; the engine never looks
//! inside a config beyond what the type capability tells it.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::versioning::WidgetRecord;

/// Capability obtained from the registry for one widget type.
pub trait WidgetType: Send + Sync {
    /// Check a (defaults-merged) config, returning every problem found.
    fn validate(&self, config: &Value) -> Result<(), Vec<String>>;

    /// Config values applied underneath whatever the editor submitted.
    fn defaults(&self) -> Value;
}

pub trait WidgetTypeRegistry: Send + Sync {
    fn get(&self, type_key: &str) -> Option<Arc<dyn WidgetType>>;
}

// ---------------------------------------------------------------------------
// Declarative widget types
// ---------------------------------------------------------------------------

/// JSON kind a config field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Bool,
    Array,
    Object,
    Any,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Any => true,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        }
    }
}

#[derive(Debug, Clone)]
struct FieldSpec {
    kind: FieldKind,
    required: bool,
}

/// A widget type described by its fields: which are required, their JSON
/// kinds, and defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default)]
pub struct SchemaWidgetType {
    fields: Vec<(String, FieldSpec)>,
    defaults: Map<String, Value>,
}

impl SchemaWidgetType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push((name.to_string(), FieldSpec { kind, required: true }));
        self
    }

    pub fn optional(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push((name.to_string(), FieldSpec { kind, required: false }));
        self
    }

    pub fn default_value(mut self, name: &str, value: Value) -> Self {
        self.defaults.insert(name.to_string(), value);
        self
    }

    fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }
}

impl WidgetType for SchemaWidgetType {
    fn validate(&self, config: &Value) -> Result<(), Vec<String>> {
        let Some(obj) = config.as_object() else {
            return Err(vec!["Config must be a JSON object".to_string()]);
        };

        let mut errors = Vec::new();
        for (name, spec) in &self.fields {
            match obj.get(name) {
                None | Some(Value::Null) if spec.required => {
                    errors.push(format!("Missing required field '{name}'"));
                }
                Some(value) if !value.is_null() && !spec.kind.matches(value) => {
                    errors.push(format!("Field '{name}' must be a {}", spec.kind.name()));
                }
                _ => {}
            }
        }
        for key in obj.keys() {
            if self.spec(key).is_none() {
                errors.push(format!("Unknown field '{key}'"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn defaults(&self) -> Value {
        Value::Object(self.defaults.clone())
    }
}

#[derive(Default, Clone)]
pub struct StaticWidgetTypeRegistry {
    types: HashMap<String, Arc<dyn WidgetType>>,
}

impl StaticWidgetTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, type_key: &str, widget_type: impl WidgetType + 'static) -> Self {
        self.types.insert(type_key.to_string(), Arc::new(widget_type));
        self
    }

    pub fn type_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.types.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl WidgetTypeRegistry for StaticWidgetTypeRegistry {
    fn get(&self, type_key: &str) -> Option<Arc<dyn WidgetType>> {
        self.types.get(type_key).cloned()
    }
}

/// The widget types every deployment understands.
pub fn builtin_widget_types() -> StaticWidgetTypeRegistry {
    StaticWidgetTypeRegistry::new()
        .register(
            "rich_text",
            SchemaWidgetType::new()
                .required("body", FieldKind::String)
                .optional("format", FieldKind::String)
                .default_value("format", Value::from("markdown")),
        )
        .register(
            "image",
            SchemaWidgetType::new()
                .required("src", FieldKind::String)
                .optional("alt", FieldKind::String)
                .optional("caption", FieldKind::String)
                .default_value("alt", Value::from("")),
        )
        .register(
            "html",
            SchemaWidgetType::new().required("html", FieldKind::String),
        )
        .register(
            "navigation",
            SchemaWidgetType::new()
                .optional("depth", FieldKind::Number)
                .optional("object_ref", FieldKind::Object)
                .default_value("depth", Value::from(1)),
        )
}

// ---------------------------------------------------------------------------
// Preparing widget lists
// ---------------------------------------------------------------------------

/// Overlay `config` on top of `defaults`. Non-object configs are returned
/// unchanged so validation can reject them.
pub fn merge_defaults(defaults: Value, config: &Value) -> Value {
    match (defaults, config) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (k, v) in overlay {
                base.insert(k.clone(), v.clone());
            }
            Value::Object(base)
        }
        (base @ Value::Object(_), Value::Null) => base,
        (_, Value::Null) => Value::Object(Map::new()),
        (_, other) => other.clone(),
    }
}

/// Validate a submitted widget list against the registry and return it ready
/// to store: defaults merged and ids assigned.
///
/// All problems across all widgets are collected into one validation error.
pub fn prepare_widgets(
    registry: &dyn WidgetTypeRegistry,
    widgets: Vec<WidgetRecord>,
) -> Result<Vec<WidgetRecord>, CoreError> {
    let mut errors = Vec::new();
    let mut prepared = Vec::with_capacity(widgets.len());

    for (index, mut widget) in widgets.into_iter().enumerate() {
        if widget.slot.trim().is_empty() {
            errors.push(format!("Widget {index}: slot must not be empty"));
        }
        let Some(widget_type) = registry.get(&widget.type_key) else {
            errors.push(format!(
                "Widget {index}: unknown widget type '{}'",
                widget.type_key
            ));
            continue;
        };

        let config = merge_defaults(widget_type.defaults(), &widget.config);
        if let Err(problems) = widget_type.validate(&config) {
            errors.extend(problems.into_iter().map(|p| format!("Widget {index}: {p}")));
            continue;
        }

        widget.config = config;
        if widget.id.trim().is_empty() {
            widget.id = uuid::Uuid::new_v4().to_string();
        }
        prepared.push(widget);
    }

    if errors.is_empty() {
        Ok(prepared)
    } else {
        Err(CoreError::Validation(errors.join("; ")))
    }
}
