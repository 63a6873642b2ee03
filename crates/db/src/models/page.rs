//! Page model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use hotspot_core::types::{DbId, Timestamp};

use crate::models::hotspot::Hotspot;

/// A row from the `pages` table.
///
/// `edit_token` is loaded so the row can be authorized against, but it is
/// never serialized: the public view must not leak it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Page {
    pub id: DbId,
    pub slug: String,
    pub title: Option<String>,
    pub image_path: Option<String>,
    pub image_url: Option<String>,
    pub image_width: Option<i32>,
    pub image_height: Option<i32>,
    #[serde(skip_serializing)]
    pub edit_token: String,
    pub owner_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The only place an edit token is ever returned: right after creation.
#[derive(Debug, Serialize)]
pub struct CreatedPage {
    pub id: DbId,
    pub slug: String,
    pub edit_token: String,
}

impl From<Page> for CreatedPage {
    fn from(page: Page) -> Self {
        Self {
            id: page.id,
            slug: page.slug,
            edit_token: page.edit_token,
        }
    }
}

/// Page metadata plus its hotspots in stacking order.
#[derive(Debug, Serialize)]
pub struct PageWithHotspots {
    pub page: Page,
    pub hotspots: Vec<Hotspot>,
}

/// DTO for creating a new page.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreatePage {
    #[validate(length(max = 200))]
    pub title: Option<String>,
}

/// DTO for renaming a page.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePage {
    #[validate(length(max = 200))]
    pub title: Option<String>,
}

/// DTO for attaching the uploaded image to a page.
#[derive(Debug, Deserialize, Validate)]
pub struct AttachImage {
    #[validate(length(min = 1, max = 1024))]
    pub image_path: String,
    #[validate(length(min = 1, max = 2048))]
    pub image_url: String,
    #[validate(range(min = 1))]
    pub image_width: Option<i32>,
    #[validate(range(min = 1))]
    pub image_height: Option<i32>,
}
