//! Repository for the `user_usage` cache and direct usage counts.

use sqlx::PgPool;

use hotspot_core::types::DbId;

use crate::models::usage::{UsageCounts, UserUsage};

/// Column list for user_usage queries.
const COLUMNS: &str = "user_id, total_hotspots, total_pages, last_updated";

/// Reads and refreshes the cached usage aggregate.
pub struct UsageRepo;

impl UsageRepo {
    /// The cached aggregate for a user, if one has been written.
    pub async fn find_cached(pool: &PgPool, user_id: DbId) -> Result<Option<UserUsage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_usage WHERE user_id = $1");
        sqlx::query_as::<_, UserUsage>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Count a user's pages and hotspots directly. This is ground truth.
    pub async fn recount(pool: &PgPool, user_id: DbId) -> Result<UsageCounts, sqlx::Error> {
        sqlx::query_as::<_, UsageCounts>(
            "SELECT
                (SELECT COUNT(*)
                   FROM hotspots h
                   JOIN pages p ON p.id = h.page_id
                  WHERE p.owner_id = $1) AS total_hotspots,
                (SELECT COUNT(*) FROM pages WHERE owner_id = $1) AS total_pages",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Recount and upsert the cached aggregate.
    pub async fn refresh(pool: &PgPool, user_id: DbId) -> Result<UserUsage, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_usage (user_id, total_hotspots, total_pages, last_updated)
             SELECT $1,
                    (SELECT COUNT(*)
                       FROM hotspots h
                       JOIN pages p ON p.id = h.page_id
                      WHERE p.owner_id = $1),
                    (SELECT COUNT(*) FROM pages WHERE owner_id = $1),
                    NOW()
             ON CONFLICT (user_id) DO UPDATE SET
                total_hotspots = EXCLUDED.total_hotspots,
                total_pages = EXCLUDED.total_pages,
                last_updated = EXCLUDED.last_updated
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserUsage>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Refresh the cache, logging instead of failing.
    ///
    /// Called after mutations that change a user's counts. The cache is an
    /// optimization; a failure here must never fail the mutation.
    pub async fn refresh_best_effort(pool: &PgPool, user_id: DbId) {
        if let Err(e) = Self::refresh(pool, user_id).await {
            tracing::warn!(user_id, error = %e, "Failed to refresh usage cache");
        }
    }
}
