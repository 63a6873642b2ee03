//! Repository for the `hotspots` table.
//!
//! Creation goes through [`HotspotRepo::create_checked`], which evaluates the
//! edit-token check and the quota check inside the same transaction as the
//! insert. Nothing else in the codebase inserts hotspots.

use sqlx::{PgPool, Postgres, Transaction};

use hotspot_core::capability::authorize;
use hotspot_core::error::CoreError;
use hotspot_core::quota::{ActorClass, QuotaPolicy, QuotaScope};
use hotspot_core::types::DbId;

use crate::models::hotspot::{CreateHotspot, Hotspot, UpdateHotspot};

/// Column list for hotspots queries.
const COLUMNS: &str = "id, page_id, x_pct, y_pct, text, z_index, created_at, updated_at";

/// Who is creating, for quota purposes.
#[derive(Debug, Clone, Copy)]
pub struct QuotaContext {
    pub actor: ActorClass,
    /// The signed-in user, required when `actor` is `SignedInFree`.
    pub user_id: Option<DbId>,
    pub policy: QuotaPolicy,
}

impl QuotaContext {
    pub fn anonymous(policy: QuotaPolicy) -> Self {
        Self {
            actor: ActorClass::Anonymous,
            user_id: None,
            policy,
        }
    }
}

/// Failure of [`HotspotRepo::create_checked`].
#[derive(Debug, thiserror::Error)]
pub enum CreateHotspotError {
    /// Denied by the capability check or the quota policy.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Provides CRUD operations for hotspots.
pub struct HotspotRepo;

impl HotspotRepo {
    /// Authorize, quota-check and insert a hotspot atomically.
    ///
    /// `input.text` must already be normalized by the caller.
    ///
    /// The page row is locked `FOR UPDATE` before counting, which serializes
    /// creates on the same page. For free-plan actors an advisory lock keyed
    /// by the user additionally serializes creates across that user's pages.
    /// Locks are always taken page-first, so two transactions cannot wait on
    /// each other in a cycle.
    pub async fn create_checked(
        pool: &PgPool,
        input: &CreateHotspot,
        edit_token: &str,
        quota: QuotaContext,
    ) -> Result<Hotspot, CreateHotspotError> {
        let mut tx = pool.begin().await?;

        let stored: Option<(String,)> =
            sqlx::query_as("SELECT edit_token FROM pages WHERE id = $1 FOR UPDATE")
                .bind(input.page_id)
                .fetch_optional(&mut *tx)
                .await?;
        authorize(stored.as_ref().map(|(t,)| t.as_str()), edit_token).into_result()?;

        let current = match quota.actor.scope() {
            Some(QuotaScope::Page) => count_on_page(&mut tx, input.page_id).await?,
            Some(QuotaScope::Owner) => {
                let user_id = quota.user_id.ok_or_else(|| {
                    CoreError::Internal("free-plan quota check without a user id".into())
                })?;
                lock_owner_quota(&mut tx, user_id).await?;
                count_for_owner(&mut tx, user_id).await?
            }
            None => 0,
        };

        if let Err(err) = quota.policy.check(quota.actor, current) {
            tracing::info!(
                page_id = input.page_id,
                user_id = ?quota.user_id,
                current,
                limit = quota.policy.limit,
                "Hotspot create refused by quota"
            );
            return Err(err.into());
        }

        let query = format!(
            "INSERT INTO hotspots (page_id, x_pct, y_pct, text)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let hotspot = sqlx::query_as::<_, Hotspot>(&query)
            .bind(input.page_id)
            .bind(input.x_pct)
            .bind(input.y_pct)
            .bind(&input.text)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(hotspot)
    }

    /// Find a hotspot by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Hotspot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hotspots WHERE id = $1");
        sqlx::query_as::<_, Hotspot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The edit token of the page owning a hotspot, for authorization.
    ///
    /// `None` when the hotspot does not exist.
    pub async fn find_page_token(pool: &PgPool, id: DbId) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT p.edit_token
             FROM hotspots h
             JOIN pages p ON p.id = h.page_id
             WHERE h.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(token,)| token))
    }

    /// The owner of the page a hotspot belongs to, if any.
    pub async fn find_page_owner(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(Option<DbId>,)> = sqlx::query_as(
            "SELECT p.owner_id
             FROM hotspots h
             JOIN pages p ON p.id = h.page_id
             WHERE h.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.and_then(|(owner,)| owner))
    }

    /// List a page's hotspots in stacking order (lowest first).
    ///
    /// Ties fall back to creation order so the list is stable.
    pub async fn list_by_page(pool: &PgPool, page_id: DbId) -> Result<Vec<Hotspot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM hotspots
             WHERE page_id = $1
             ORDER BY z_index ASC, created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Hotspot>(&query)
            .bind(page_id)
            .fetch_all(pool)
            .await
    }

    /// Patch a hotspot. `text` must already be normalized by the caller.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateHotspot,
    ) -> Result<Option<Hotspot>, sqlx::Error> {
        let query = format!(
            "UPDATE hotspots SET
                text = COALESCE($1, text),
                x_pct = COALESCE($2, x_pct),
                y_pct = COALESCE($3, y_pct),
                z_index = COALESCE($4, z_index),
                updated_at = NOW()
             WHERE id = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hotspot>(&query)
            .bind(&input.text)
            .bind(input.x_pct)
            .bind(input.y_pct)
            .bind(input.z_index)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a hotspot by its ID. Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM hotspots WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of hotspots on one page.
    pub async fn count_by_page(pool: &PgPool, page_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM hotspots WHERE page_id = $1")
            .bind(page_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Transaction helpers
// ---------------------------------------------------------------------------

async fn count_on_page(
    tx: &mut Transaction<'_, Postgres>,
    page_id: DbId,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM hotspots WHERE page_id = $1")
        .bind(page_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(count)
}

async fn count_for_owner(
    tx: &mut Transaction<'_, Postgres>,
    user_id: DbId,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*)
         FROM hotspots h
         JOIN pages p ON p.id = h.page_id
         WHERE p.owner_id = $1",
    )
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(count)
}

/// Transaction-scoped advisory lock serializing one user's quota checks.
/// Released automatically at commit or rollback.
async fn lock_owner_quota(
    tx: &mut Transaction<'_, Postgres>,
    user_id: DbId,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended('owner_quota:' || $1::text, 0))")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
