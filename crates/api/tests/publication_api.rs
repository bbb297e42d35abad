//! HTTP-level tests for the publication endpoints.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, create_page, post_empty, post_json};
use serde_json::json;
use sqlx::PgPool;

const PUBLISHED: i64 = 3;
const SCHEDULED: i64 = 2;
const UNPUBLISHED: i64 = 1;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_then_publish_again_reports_unchanged(pool: PgPool) {
    let page = create_page(&pool, json!({ "title": "Home" })).await;
    let id = page["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_empty(app, &format!("/api/v1/pages/{id}/publish")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["changed"], true);

    let app = common::build_test_app(pool.clone());
    let response = post_empty(app, &format!("/api/v1/pages/{id}/publish")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["changed"], false);

    let app = common::build_test_app(pool);
    let response = common::get(app, &format!("/api/v1/pages/{id}")).await;
    assert_eq!(body_json(response).await["data"]["status_id"], PUBLISHED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expire_unpublished_page_reports_unchanged(pool: PgPool) {
    let page = create_page(&pool, json!({ "title": "Home" })).await;
    let id = page["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = post_empty(app, &format!("/api/v1/pages/{id}/expire")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["changed"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_schedule_rejects_inverted_window(pool: PgPool) {
    let page = create_page(&pool, json!({ "title": "Home" })).await;
    let id = page["id"].as_i64().unwrap();
    let start = Utc::now() + Duration::days(2);
    let end = Utc::now() + Duration::days(1);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/pages/{id}/schedule"),
        json!({ "effective_date": start, "expiry_date": end }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_schedule_then_unpublish(pool: PgPool) {
    let page = create_page(&pool, json!({ "title": "Home" })).await;
    let id = page["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/pages/{id}/schedule"),
        json!({ "effective_date": Utc::now() + Duration::days(1) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status_id"], SCHEDULED);

    let app = common::build_test_app(pool);
    let response = post_empty(app, &format!("/api/v1/pages/{id}/unpublish")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status_id"], UNPUBLISHED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_now_outcomes(pool: PgPool) {
    let page = create_page(&pool, json!({ "title": "Home" })).await;
    let id = page["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/pages/{id}/publish-now"),
        json!({ "effective_date": Utc::now() + Duration::hours(3) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["outcome"], "scheduled");
    assert_eq!(json["data"]["page"]["status_id"], SCHEDULED);

    // No body publishes immediately.
    let app = common::build_test_app(pool);
    let response = post_empty(app, &format!("/api/v1/pages/{id}/publish-now")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["outcome"], "published");
    assert_eq!(json["data"]["page"]["status_id"], PUBLISHED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_publish_reports_per_page(pool: PgPool) {
    let a = create_page(&pool, json!({ "title": "A" })).await;
    let b = create_page(&pool, json!({ "title": "B" })).await;
    let a_id = a["id"].as_i64().unwrap();
    let b_id = b["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/pages/bulk-publish",
        json!({ "page_ids": [a_id, 999999, b_id] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let results = json["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["page_id"], a_id);
    assert_eq!(results[1]["page_id"], b_id);
    assert_eq!(json["data"]["errors"][0]["page_id"], 999999);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_publish_requires_ids(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/pages/bulk-publish", json!({ "page_ids": [] })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
