//! Repository for the `themes` table.

use sqlx::PgPool;
use trellis_core::types::DbId;

use crate::models::theme::{CreateTheme, Theme};

/// Column list for themes queries.
const COLUMNS: &str = "id, name, tokens, created_at, updated_at";

/// Provides data access for registered themes.
pub struct ThemeRepo;

impl ThemeRepo {
    pub async fn create(pool: &PgPool, input: &CreateTheme) -> Result<Theme, sqlx::Error> {
        let query = format!(
            "INSERT INTO themes (name, tokens)
             VALUES ($1, COALESCE($2, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Theme>(&query)
            .bind(&input.name)
            .bind(&input.tokens)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Theme>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM themes WHERE id = $1");
        sqlx::query_as::<_, Theme>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Theme>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM themes ORDER BY name");
        sqlx::query_as::<_, Theme>(&query).fetch_all(pool).await
    }
}
