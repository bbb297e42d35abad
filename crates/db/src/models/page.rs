//! Page entity model and DTOs.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use trellis_core::error::CoreError;
use trellis_core::hierarchy::TreeNode;
use trellis_core::publication::{PublicationState, PublicationStatus};
use trellis_core::types::{DbId, Timestamp};
use trellis_core::versioning::PageData;

use super::status::{publication_status, StatusId};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `pages` table, with its hostname claims aggregated in.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Page {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub sort_order: i32,
    pub layout_key: Option<String>,
    pub theme_id: Option<DbId>,
    pub status_id: StatusId,
    pub effective_date: Option<Timestamp>,
    pub expiry_date: Option<Timestamp>,
    pub seo_title: Option<String>,
    pub meta_description: Option<String>,
    pub show_in_menus: bool,
    pub hostnames: Vec<String>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Page {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn publication_status(&self) -> Result<PublicationStatus, CoreError> {
        publication_status(self.status_id)
    }

    pub fn publication_state(&self) -> Result<PublicationState, CoreError> {
        Ok(PublicationState {
            status: self.publication_status()?,
            effective_date: self.effective_date,
            expiry_date: self.expiry_date,
        })
    }

    /// Snapshot of the scalar fields, as frozen into a version.
    pub fn to_page_data(&self) -> Result<PageData, CoreError> {
        Ok(PageData {
            title: self.title.clone(),
            slug: self.slug.clone(),
            parent_id: self.parent_id,
            sort_order: self.sort_order,
            layout_key: self.layout_key.clone(),
            theme_id: self.theme_id,
            publication_status: self.publication_status()?,
            effective_date: self.effective_date,
            expiry_date: self.expiry_date,
            seo_title: self.seo_title.clone(),
            meta_description: self.meta_description.clone(),
            show_in_menus: self.show_in_menus,
        })
    }
}

impl TreeNode for Page {
    fn node_id(&self) -> DbId {
        self.id
    }

    fn node_parent_id(&self) -> Option<DbId> {
        self.parent_id
    }

    fn node_slug(&self) -> &str {
        &self.slug
    }

    fn node_title(&self) -> &str {
        &self.title
    }
}

/// A root page matched by one of its hostname claims.
#[derive(Debug, Clone, FromRow)]
pub struct HostnameMatch {
    pub matched_hostname: String,
    #[sqlx(flatten)]
    pub page: Page,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a page. The slug is generated from the title when absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePage {
    pub title: String,
    pub slug: Option<String>,
    pub parent_id: Option<DbId>,
    pub sort_order: Option<i32>,
    pub layout_key: Option<String>,
    pub theme_id: Option<DbId>,
    pub hostnames: Option<Vec<String>>,
    pub effective_date: Option<Timestamp>,
    pub expiry_date: Option<Timestamp>,
    pub seo_title: Option<String>,
    pub meta_description: Option<String>,
    pub show_in_menus: Option<bool>,
}

/// DTO for partially updating a page.
///
/// Nullable columns use `Option<Option<_>>`: an absent key leaves the value
/// alone, an explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePage {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub sort_order: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub layout_key: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub theme_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub seo_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub meta_description: Option<Option<String>>,
    pub show_in_menus: Option<bool>,
}

impl UpdatePage {
    /// Apply the patch on top of existing page data.
    pub fn apply_to(&self, data: &mut PageData) {
        if let Some(title) = &self.title {
            data.title = title.clone();
        }
        if let Some(slug) = &self.slug {
            data.slug = slug.clone();
        }
        if let Some(sort_order) = self.sort_order {
            data.sort_order = sort_order;
        }
        if let Some(layout_key) = &self.layout_key {
            data.layout_key = layout_key.clone();
        }
        if let Some(theme_id) = self.theme_id {
            data.theme_id = theme_id;
        }
        if let Some(seo_title) = &self.seo_title {
            data.seo_title = seo_title.clone();
        }
        if let Some(meta_description) = &self.meta_description {
            data.meta_description = meta_description.clone();
        }
        if let Some(show_in_menus) = self.show_in_menus {
            data.show_in_menus = show_in_menus;
        }
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
