//! Integration tests for the page version repository and its constraints.

use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use trellis_core::publication::PublicationStatus;
use trellis_core::versioning::{PageData, VersionStatus, WidgetRecord};
use trellis_db::models::page_version::NewPageVersion;
use trellis_db::repositories::{PageRepo, PageVersionRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn page_data(slug: &str) -> PageData {
    PageData {
        title: slug.to_string(),
        slug: slug.to_string(),
        parent_id: None,
        sort_order: 0,
        layout_key: None,
        theme_id: None,
        publication_status: PublicationStatus::Unpublished,
        effective_date: None,
        expiry_date: None,
        seo_title: None,
        meta_description: None,
        show_in_menus: true,
    }
}

fn new_version(page_id: i64, widgets: Vec<WidgetRecord>) -> NewPageVersion {
    NewPageVersion {
        page_id,
        page_data: page_data("home"),
        widgets,
        description: Some("test".to_string()),
        created_by: Some(1),
    }
}

fn widget(id: &str) -> WidgetRecord {
    WidgetRecord {
        id: id.to_string(),
        slot: "main".to_string(),
        order: 0,
        type_key: "html".to_string(),
        config: json!({ "html": "<p>hi</p>" }),
        inherit_from_parent: true,
        override_parent: false,
    }
}

async fn setup_page(pool: &PgPool) -> i64 {
    PageRepo::create(pool, &page_data("home"), None).await.unwrap().id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_version_numbers_increment_per_page(pool: PgPool) {
    let page = setup_page(&pool).await;
    let v1 = PageVersionRepo::create(&pool, &new_version(page, vec![])).await.unwrap();
    let v2 = PageVersionRepo::create(&pool, &new_version(page, vec![])).await.unwrap();

    assert_eq!(v1.version_number, 1);
    assert_eq!(v2.version_number, 2);
    assert_eq!(v1.status().unwrap(), VersionStatus::Draft);
    assert!(!v1.is_current);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_widgets_round_trip_as_json(pool: PgPool) {
    let page = setup_page(&pool).await;
    let created = PageVersionRepo::create(&pool, &new_version(page, vec![widget("w1")]))
        .await
        .unwrap();
    let loaded = PageVersionRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.widgets.0, vec![widget("w1")]);
    assert_eq!(loaded.page_data.0.slug, "home");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_current_flag_swaps(pool: PgPool) {
    let page = setup_page(&pool).await;
    let v1 = PageVersionRepo::create(&pool, &new_version(page, vec![])).await.unwrap();
    let v2 = PageVersionRepo::create(&pool, &new_version(page, vec![])).await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    PageVersionRepo::clear_current(&mut *tx, page, v1.id).await.unwrap();
    PageVersionRepo::mark_published(&mut *tx, v1.id, Some(1), Utc::now())
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    assert_eq!(
        PageVersionRepo::clear_current(&mut *tx, page, v2.id).await.unwrap(),
        1
    );
    PageVersionRepo::mark_published(&mut *tx, v2.id, Some(1), Utc::now())
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let current = PageVersionRepo::find_current(&pool, page).await.unwrap().unwrap();
    assert_eq!(current.id, v2.id);
    let v1 = PageVersionRepo::find_by_id(&pool, v1.id).await.unwrap().unwrap();
    assert!(!v1.is_current);
    assert_eq!(v1.status().unwrap(), VersionStatus::Published);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_two_current_versions_rejected_by_index(pool: PgPool) {
    let page = setup_page(&pool).await;
    let v1 = PageVersionRepo::create(&pool, &new_version(page, vec![])).await.unwrap();
    let v2 = PageVersionRepo::create(&pool, &new_version(page, vec![])).await.unwrap();

    PageVersionRepo::mark_published(&pool, v1.id, None, Utc::now())
        .await
        .unwrap();
    let err = PageVersionRepo::mark_published(&pool, v2.id, None, Utc::now())
        .await
        .unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_page_versions_current")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_current_requires_published_status(pool: PgPool) {
    let page = setup_page(&pool).await;
    let v1 = PageVersionRepo::create(&pool, &new_version(page, vec![])).await.unwrap();
    let result = sqlx::query("UPDATE page_versions SET is_current = true WHERE id = $1")
        .bind(v1.id)
        .execute(&pool)
        .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_widgets_only_on_drafts(pool: PgPool) {
    let page = setup_page(&pool).await;
    let draft = PageVersionRepo::create(&pool, &new_version(page, vec![])).await.unwrap();

    assert_eq!(draft.updated_by, None);
    let updated = PageVersionRepo::replace_draft_widgets(&pool, draft.id, &[widget("w1")], Some(9))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.widgets.0.len(), 1);
    assert_eq!(updated.updated_by, Some(9));

    PageVersionRepo::mark_published(&pool, draft.id, None, Utc::now())
        .await
        .unwrap();
    let refused = PageVersionRepo::replace_draft_widgets(&pool, draft.id, &[], Some(9))
        .await
        .unwrap();
    assert!(refused.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_latest_draft_and_list_order(pool: PgPool) {
    let page = setup_page(&pool).await;
    let v1 = PageVersionRepo::create(&pool, &new_version(page, vec![])).await.unwrap();
    let v2 = PageVersionRepo::create(&pool, &new_version(page, vec![])).await.unwrap();
    PageVersionRepo::mark_published(&pool, v2.id, None, Utc::now())
        .await
        .unwrap();

    let latest = PageVersionRepo::find_latest_draft(&pool, page).await.unwrap().unwrap();
    assert_eq!(latest.id, v1.id);

    let numbers: Vec<i32> = PageVersionRepo::list_for_page(&pool, page)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.version_number)
        .collect();
    assert_eq!(numbers, vec![2, 1]);

    let current = PageVersionRepo::find_current_for_pages(&pool, &[page]).await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].id, v2.id);
}
