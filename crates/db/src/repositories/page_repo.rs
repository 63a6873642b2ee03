//! Repository for the `pages` table.

use sqlx::PgPool;

use hotspot_core::types::DbId;

use crate::models::page::{AttachImage, Page};

/// Column list for pages queries.
const COLUMNS: &str = "id, slug, title, image_path, image_url, image_width, image_height, \
    edit_token, owner_id, created_at, updated_at";

/// Unique constraint that guards slug collisions.
pub const SLUG_CONSTRAINT: &str = "uq_pages_slug";

/// Provides CRUD operations for pages.
pub struct PageRepo;

impl PageRepo {
    /// Insert a new page. The slug and edit token are generated by the caller.
    ///
    /// A slug collision surfaces as a unique violation on
    /// [`SLUG_CONSTRAINT`]; see [`is_slug_collision`].
    pub async fn create(
        pool: &PgPool,
        slug: &str,
        edit_token: &str,
        title: Option<&str>,
        owner_id: Option<DbId>,
    ) -> Result<Page, sqlx::Error> {
        let query = format!(
            "INSERT INTO pages (slug, edit_token, title, owner_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(slug)
            .bind(edit_token)
            .bind(title)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find a page by its public slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Page>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE slug = $1");
        sqlx::query_as::<_, Page>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Find a page by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Page>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE id = $1");
        sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the page title.
    pub async fn update_title(
        pool: &PgPool,
        id: DbId,
        title: Option<&str>,
    ) -> Result<Option<Page>, sqlx::Error> {
        let query = format!(
            "UPDATE pages SET title = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(title)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Attach the uploaded image reference to a page.
    pub async fn attach_image(
        pool: &PgPool,
        id: DbId,
        input: &AttachImage,
    ) -> Result<Option<Page>, sqlx::Error> {
        let query = format!(
            "UPDATE pages SET
                image_path = $1,
                image_url = $2,
                image_width = $3,
                image_height = $4,
                updated_at = NOW()
             WHERE id = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(&input.image_path)
            .bind(&input.image_url)
            .bind(input.image_width)
            .bind(input.image_height)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Whether an insert failed only because the generated slug was taken.
pub fn is_slug_collision(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(SLUG_CONSTRAINT),
        _ => false,
    }
}
