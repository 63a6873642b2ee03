//! Handlers for hotspot mutations.
//!
//! Every endpoint here is gated by the page's edit token. Reads go through
//! the page view instead.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use hotspot_core::capability::authorize;
use hotspot_core::error::CoreError;
use hotspot_core::hotspot::normalize_text;
use hotspot_core::types::DbId;
use hotspot_db::models::hotspot::{CreateHotspot, Hotspot, UpdateHotspot};
use hotspot_db::repositories::{HotspotRepo, UsageRepo};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::edit_token::EditToken;
use crate::response::{DataResponse, Deleted};
use crate::state::AppState;

/// POST /hotspot
///
/// Authorization, the quota check and the insert commit together, so two
/// concurrent creates at the limit cannot both succeed.
pub async fn create_hotspot(
    auth: MaybeAuthUser,
    State(state): State<AppState>,
    token: EditToken,
    AppJson(mut input): AppJson<CreateHotspot>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    input.text = normalize_text(&input.text)?;

    let quota = auth.quota_context(&state).await?;
    let hotspot =
        HotspotRepo::create_checked(&state.pool, &input, token.as_str(), quota).await?;

    tracing::info!(
        hotspot_id = hotspot.id,
        page_id = hotspot.page_id,
        actor = ?quota.actor,
        "Hotspot created"
    );

    refresh_owner_usage(&state, hotspot.id).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: hotspot })))
}

/// PATCH /hotspot/{id}
///
/// Absent fields are left unchanged. A hotspot deleted between the token
/// check and the write yields 404.
pub async fn update_hotspot(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    token: EditToken,
    AppJson(mut input): AppJson<UpdateHotspot>,
) -> AppResult<Json<DataResponse<Hotspot>>> {
    input.validate()?;
    if let Some(text) = input.text.as_deref() {
        input.text = Some(normalize_text(text)?);
    }

    let stored = HotspotRepo::find_page_token(&state.pool, id).await?;
    authorize(stored.as_deref(), token.as_str()).into_result()?;

    let hotspot = HotspotRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Hotspot",
            id,
        })?;

    tracing::info!(hotspot_id = id, page_id = hotspot.page_id, "Hotspot updated");
    Ok(Json(DataResponse { data: hotspot }))
}

/// DELETE /hotspot/{id}
pub async fn delete_hotspot(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    token: EditToken,
) -> AppResult<Json<DataResponse<Deleted>>> {
    let stored = HotspotRepo::find_page_token(&state.pool, id).await?;
    authorize(stored.as_deref(), token.as_str()).into_result()?;

    // Looked up before the row disappears.
    let owner = HotspotRepo::find_page_owner(&state.pool, id).await?;

    if !HotspotRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Hotspot",
            id,
        }
        .into());
    }

    tracing::info!(hotspot_id = id, "Hotspot deleted");

    if let Some(owner) = owner {
        UsageRepo::refresh_best_effort(&state.pool, owner).await;
    }

    Ok(Json(DataResponse {
        data: Deleted { deleted: true },
    }))
}

/// Refresh the cached usage of the owner of the page `hotspot_id` is on.
///
/// The owner is not necessarily the caller: any token holder may add
/// hotspots to an owned page, and they count against the owner.
async fn refresh_owner_usage(state: &AppState, hotspot_id: DbId) {
    match HotspotRepo::find_page_owner(&state.pool, hotspot_id).await {
        Ok(Some(owner)) => UsageRepo::refresh_best_effort(&state.pool, owner).await,
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(hotspot_id, error = %e, "Failed to look up page owner for usage refresh");
        }
    }
}
