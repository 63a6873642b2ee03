//! Repository for the `user_profiles` table.

use sqlx::PgPool;

use hotspot_core::quota::PlanType;
use hotspot_core::types::DbId;

use crate::models::user_profile::{CreateUserProfile, UserProfile};

/// Column list for user_profiles queries.
const COLUMNS: &str =
    "id, email, full_name, plan_type, subscription_status, created_at, updated_at";

/// Provides lookups and provisioning for user profiles.
pub struct UserProfileRepo;

impl UserProfileRepo {
    /// Provision a new profile.
    pub async fn create(
        pool: &PgPool,
        input: &CreateUserProfile,
    ) -> Result<UserProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_profiles (email, full_name, plan_type)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(input.plan_type.as_str())
            .fetch_one(pool)
            .await
    }

    /// Make sure a profile row exists for `id`, creating a free-plan one if
    /// not. Returns whether a row was inserted.
    ///
    /// Tokens can name users the database has not seen yet; anything keyed
    /// on the user (page ownership, usage) needs the row first.
    pub async fn ensure(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_profiles (id, plan_type)
             VALUES ($1, $2)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(PlanType::Free.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Find a profile by user ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_profiles WHERE id = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Change a user's plan (subscription lifecycle is external; this is the
    /// single write it performs against the core).
    pub async fn set_plan(
        pool: &PgPool,
        id: DbId,
        plan: PlanType,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE user_profiles SET plan_type = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(plan.as_str())
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
