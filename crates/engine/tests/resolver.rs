//! Integration tests for layout, theme, and widget inheritance over stored
//! page trees.

mod common;

use common::{create_child, create_root, engine, publish_widgets, widget, USER};
use serde_json::json;
use sqlx::PgPool;
use trellis_core::versioning::WidgetRecord;
use trellis_db::models::page::UpdatePage;

fn inheritable(id: &str, slot: &str, order: i32) -> WidgetRecord {
    WidgetRecord {
        inherit_from_parent: true,
        ..widget(id, slot, order)
    }
}

fn ids(widgets: &[trellis_core::inheritance::ResolvedWidget]) -> Vec<&str> {
    widgets.iter().map(|w| w.widget.id.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Widget slots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_child_inherits_parent_widget(pool: PgPool) {
    let engine = engine(pool);
    let root = create_root(&engine, "home", &[]).await;
    let child = create_child(&engine, root.id, "about").await;
    publish_widgets(&engine, root.id, vec![inheritable("A", "main", 0)]).await;

    let main = engine.resolver.resolve_slot(child.id, "main").await.unwrap();
    assert_eq!(ids(&main), vec!["A"]);
    assert!(main[0].inherited);
    assert_eq!(main[0].source_page_id, root.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_own_widget_precedes_inherited(pool: PgPool) {
    let engine = engine(pool);
    let root = create_root(&engine, "home", &[]).await;
    let child = create_child(&engine, root.id, "about").await;
    publish_widgets(&engine, root.id, vec![inheritable("A", "main", 0)]).await;
    publish_widgets(&engine, child.id, vec![widget("B", "main", 0)]).await;

    let main = engine.resolver.resolve_slot(child.id, "main").await.unwrap();
    assert_eq!(ids(&main), vec!["B", "A"]);
    assert!(!main[0].inherited);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_inheritable_ancestor_widgets_skipped(pool: PgPool) {
    let engine = engine(pool);
    let root = create_root(&engine, "home", &[]).await;
    let child = create_child(&engine, root.id, "about").await;
    publish_widgets(
        &engine,
        root.id,
        vec![widget("local", "main", 0), inheritable("shared", "main", 1)],
    )
    .await;

    let main = engine.resolver.resolve_slot(child.id, "main").await.unwrap();
    assert_eq!(ids(&main), vec!["shared"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_override_resets_own_list_but_ancestors_still_append(pool: PgPool) {
    let engine = engine(pool);
    let root = create_root(&engine, "home", &[]).await;
    let child = create_child(&engine, root.id, "about").await;
    publish_widgets(&engine, root.id, vec![inheritable("A", "main", 0)]).await;
    publish_widgets(
        &engine,
        child.id,
        vec![
            widget("B", "main", 0),
            WidgetRecord {
                override_parent: true,
                ..widget("C", "main", 1)
            },
            widget("D", "main", 2),
        ],
    )
    .await;

    let main = engine.resolver.resolve_slot(child.id, "main").await.unwrap();
    assert_eq!(ids(&main), vec!["C", "D", "A"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_drafts_do_not_affect_resolution(pool: PgPool) {
    let engine = engine(pool);
    let root = create_root(&engine, "home", &[]).await;
    publish_widgets(&engine, root.id, vec![widget("live", "main", 0)]).await;

    let draft = engine
        .versions
        .create_version(root.id, &Default::default(), USER)
        .await
        .unwrap();
    engine
        .versions
        .replace_draft_widgets(draft.id, vec![widget("pending", "main", 0)], USER)
        .await
        .unwrap();

    let main = engine.resolver.resolve_slot(root.id, "main").await.unwrap();
    assert_eq!(ids(&main), vec!["live"]);
}

// ---------------------------------------------------------------------------
// Layout and theme
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_layout_and_theme_come_from_nearest_ancestor(pool: PgPool) {
    let engine = engine(pool);
    let root = create_root(&engine, "home", &[]).await;
    let about = create_child(&engine, root.id, "about").await;
    let team = create_child(&engine, about.id, "team").await;

    let root_patch: UpdatePage = serde_json::from_value(json!({
        "layout_key": "standard",
        "theme_id": 1
    }))
    .unwrap();
    engine.hierarchy.update_page(root.id, &root_patch, USER).await.unwrap();
    let about_patch: UpdatePage =
        serde_json::from_value(json!({ "layout_key": "retired" })).unwrap();
    engine.hierarchy.update_page(about.id, &about_patch, USER).await.unwrap();

    let layout = engine.resolver.resolve_layout(team.id).await.unwrap().unwrap();
    assert_eq!(layout.layout.key, "standard");
    assert_eq!(layout.source_page_id, root.id);

    let theme = engine.resolver.resolve_theme(team.id).await.unwrap().unwrap();
    assert_eq!(theme.theme.id, 1);
    assert_eq!(theme.source_page_id, root.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_no_layout_anywhere_resolves_to_none(pool: PgPool) {
    let engine = engine(pool);
    let root = create_root(&engine, "home", &[]).await;
    let child = create_child(&engine, root.id, "about").await;

    assert!(engine.resolver.resolve_layout(child.id).await.unwrap().is_none());
    assert!(engine.resolver.resolve_theme(child.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Whole page
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resolve_page_unions_layout_and_widget_slots(pool: PgPool) {
    let engine = engine(pool);
    let root = create_root(&engine, "home", &[]).await;
    let patch: UpdatePage = serde_json::from_value(json!({ "layout_key": "standard" })).unwrap();
    engine.hierarchy.update_page(root.id, &patch, USER).await.unwrap();
    publish_widgets(&engine, root.id, vec![inheritable("F", "footer", 0)]).await;

    let child = create_child(&engine, root.id, "about").await;
    let resolved = engine.resolver.resolve_page(child.id).await.unwrap();

    let slots: Vec<&str> = resolved.slots.keys().map(String::as_str).collect();
    assert_eq!(slots, vec!["footer", "main", "sidebar"]);
    assert_eq!(ids(&resolved.slots["footer"]), vec!["F"]);
    assert!(resolved.slots["main"].is_empty());
    assert_eq!(resolved.page_id, child.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resolve_page_expands_page_references(pool: PgPool) {
    let engine = engine(pool);
    let root = create_root(&engine, "home", &[]).await;
    let contact = create_child(&engine, root.id, "contact").await;

    let nav = WidgetRecord {
        type_key: "navigation".to_string(),
        config: json!({ "object_ref": { "kind": "page", "id": contact.id } }),
        ..widget("nav", "main", 0)
    };
    publish_widgets(&engine, root.id, vec![nav]).await;

    let resolved = engine.resolver.resolve_page(root.id).await.unwrap();
    let config = &resolved.slots["main"][0].widget.config;
    assert_eq!(config["object"]["id"], json!(contact.id));
    assert_eq!(config["object"]["url"], "/home/contact");
    assert_eq!(config["depth"], 1);
}
