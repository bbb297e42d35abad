//! HTTP-level tests for the layout and theme registries.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_and_list_layouts(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/layouts",
        json!({ "key": "landing", "name": "Landing", "slots": ["hero", "main"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["is_active"], true);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/layouts").await;
    let layouts = body_json(response).await["data"].clone();
    assert_eq!(layouts.as_array().unwrap().len(), 1);
    assert_eq!(layouts[0]["slots"], json!(["hero", "main"]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_layout_key_conflicts(pool: PgPool) {
    let body = json!({ "key": "landing", "name": "Landing", "slots": [] });

    let app = common::build_test_app(pool.clone());
    assert_eq!(
        post_json(app, "/api/v1/layouts", body.clone()).await.status(),
        StatusCode::CREATED
    );

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/layouts", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_retire_unknown_layout_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        "/api/v1/layouts/nope/active",
        json!({ "is_active": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_theme_defaults_tokens(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/themes", json!({ "name": "Dark" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let theme = body_json(response).await["data"].clone();
    assert_eq!(theme["tokens"], json!({}));

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/themes").await;
    let themes = body_json(response).await["data"].clone();
    assert_eq!(themes[0]["id"], theme["id"]);
}
