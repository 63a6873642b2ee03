//! Handler for the signed-in user's usage summary.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use hotspot_core::quota::{ActorClass, PlanType};
use hotspot_db::repositories::UsageRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Where the reported counts came from.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    Cache,
    Recount,
}

/// Response body for `GET /me/usage`.
#[derive(Debug, Serialize)]
pub struct UsageSummary {
    pub plan: PlanType,
    pub total_hotspots: i64,
    pub total_pages: i64,
    /// `None` for plans without a cap.
    pub limit: Option<i64>,
    /// `None` for plans without a cap.
    pub remaining: Option<i64>,
    pub source: UsageSource,
}

/// GET /me/usage
///
/// Reports the cached aggregate when one exists and falls back to a direct
/// count otherwise. This is display data; create requests are always
/// checked against a fresh count.
pub async fn get_usage(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UsageSummary>>> {
    let plan = auth.plan(&state.pool).await?;
    let actor = ActorClass::from_plan(Some(plan));
    let policy = state.config.quota_policy();

    let (total_hotspots, total_pages, source) =
        match UsageRepo::find_cached(&state.pool, auth.user_id).await? {
            Some(cached) => (cached.total_hotspots, cached.total_pages, UsageSource::Cache),
            None => {
                let counts = UsageRepo::recount(&state.pool, auth.user_id).await?;
                (counts.total_hotspots, counts.total_pages, UsageSource::Recount)
            }
        };

    let remaining = policy.remaining(actor, total_hotspots);
    let limit = remaining.map(|_| policy.limit);

    Ok(Json(DataResponse {
        data: UsageSummary {
            plan,
            total_hotspots,
            total_pages,
            limit,
            remaining,
            source,
        },
    }))
}
