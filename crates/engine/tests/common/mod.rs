//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use sqlx::PgPool;
use trellis_core::content_ref::TransformRegistry;
use trellis_core::registry::{
    LayoutDescriptor, StaticLayoutRegistry, StaticThemeRegistry, ThemeDescriptor,
};
use trellis_core::types::DbId;
use trellis_core::versioning::WidgetRecord;
use trellis_core::widget_types::builtin_widget_types;
use trellis_db::models::page::{CreatePage, Page};
use trellis_db::models::page_version::{CreatePageVersion, PageVersion};
use trellis_engine::Engine;

pub const USER: Option<DbId> = Some(1);

/// Engine over the given pool with a `standard` layout (`main`, `sidebar`)
/// and theme 1 registered.
pub fn engine(pool: PgPool) -> Engine {
    let layouts = StaticLayoutRegistry::new([LayoutDescriptor {
        key: "standard".to_string(),
        name: "Standard".to_string(),
        slots: vec!["main".to_string(), "sidebar".to_string()],
        is_active: true,
    }]);
    let themes = StaticThemeRegistry::new([ThemeDescriptor {
        id: 1,
        name: "Default".to_string(),
        tokens: json!({ "primary": "#224466" }),
    }]);

    Engine::new(
        pool,
        Arc::new(layouts),
        Arc::new(themes),
        Arc::new(builtin_widget_types()),
        TransformRegistry::new(),
    )
}

pub async fn create_root(engine: &Engine, slug: &str, hostnames: &[&str]) -> Page {
    engine
        .hierarchy
        .create_page(
            &CreatePage {
                title: slug.to_string(),
                slug: Some(slug.to_string()),
                hostnames: Some(hostnames.iter().map(|h| h.to_string()).collect()),
                ..Default::default()
            },
            USER,
        )
        .await
        .unwrap()
}

pub async fn create_child(engine: &Engine, parent_id: DbId, slug: &str) -> Page {
    engine
        .hierarchy
        .create_page(
            &CreatePage {
                title: slug.to_string(),
                slug: Some(slug.to_string()),
                parent_id: Some(parent_id),
                ..Default::default()
            },
            USER,
        )
        .await
        .unwrap()
}

/// An `html` widget.
pub fn widget(id: &str, slot: &str, order: i32) -> WidgetRecord {
    WidgetRecord {
        id: id.to_string(),
        slot: slot.to_string(),
        order,
        type_key: "html".to_string(),
        config: json!({ "html": format!("<p>{id}</p>") }),
        inherit_from_parent: false,
        override_parent: false,
    }
}

/// Create a draft, set its widgets, and publish it.
pub async fn publish_widgets(
    engine: &Engine,
    page_id: DbId,
    widgets: Vec<WidgetRecord>,
) -> PageVersion {
    let draft = engine
        .versions
        .create_version(page_id, &CreatePageVersion::default(), USER)
        .await
        .unwrap();
    engine
        .versions
        .replace_draft_widgets(draft.id, widgets, USER)
        .await
        .unwrap();
    engine.versions.publish(draft.id, USER).await.unwrap()
}
