//! Repository for the `layouts` table.

use sqlx::PgPool;

use crate::models::layout::{CreateLayout, Layout};

/// Column list for layouts queries.
const COLUMNS: &str = "id, key, name, slots, is_active, created_at, updated_at";

/// Provides data access for registered layouts.
pub struct LayoutRepo;

impl LayoutRepo {
    pub async fn create(pool: &PgPool, input: &CreateLayout) -> Result<Layout, sqlx::Error> {
        let query = format!(
            "INSERT INTO layouts (key, name, slots, is_active)
             VALUES ($1, $2, $3, COALESCE($4, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Layout>(&query)
            .bind(&input.key)
            .bind(&input.name)
            .bind(&input.slots)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find an active layout by key. Inactive layouts resolve as absent.
    pub async fn find_active_by_key(
        pool: &PgPool,
        key: &str,
    ) -> Result<Option<Layout>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM layouts WHERE key = $1 AND is_active = true");
        sqlx::query_as::<_, Layout>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_active(pool: &PgPool) -> Result<Vec<Layout>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM layouts WHERE is_active = true ORDER BY key");
        sqlx::query_as::<_, Layout>(&query).fetch_all(pool).await
    }

    /// Returns `true` if the layout existed.
    pub async fn set_active(pool: &PgPool, key: &str, is_active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE layouts SET is_active = $2 WHERE key = $1")
            .bind(key)
            .bind(is_active)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
