//! JWT-based authentication extractors for Axum handlers.
//!
//! Identity never grants mutation rights; it only decides which quota an
//! actor is measured against and whose usage `/me/usage` reports.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use hotspot_core::error::CoreError;
use hotspot_core::quota::{ActorClass, PlanType};
use hotspot_core::types::DbId;
use hotspot_db::repositories::{QuotaContext, UserProfileRepo};
use hotspot_db::DbPool;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// Rejects the request with 401 when the header is missing or invalid.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
}

/// Signed-in identity when present.
///
/// An absent `Authorization` header yields `MaybeAuthUser(None)`. A header
/// that is present but malformed or invalid is still rejected with 401, so
/// a client with an expired session learns about it instead of silently
/// being treated as anonymous.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        parse_bearer(auth_header, state)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts.headers.get(AUTHORIZATION) {
            None => Ok(MaybeAuthUser(None)),
            Some(value) => {
                let header = value.to_str().map_err(|_| {
                    AppError::Core(CoreError::Unauthorized(
                        "Invalid Authorization header".into(),
                    ))
                })?;
                Ok(MaybeAuthUser(Some(parse_bearer(header, state)?)))
            }
        }
    }
}

fn parse_bearer(header: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })?;

    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;

    Ok(AuthUser {
        user_id: claims.sub,
    })
}

impl AuthUser {
    /// The user's plan. A user with no profile row yet is on the free plan.
    pub async fn plan(&self, pool: &DbPool) -> AppResult<PlanType> {
        match UserProfileRepo::find_by_id(pool, self.user_id).await? {
            Some(profile) => Ok(profile.plan()?),
            None => Ok(PlanType::Free),
        }
    }
}

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<DbId> {
        self.0.as_ref().map(|u| u.user_id)
    }

    /// Classify the caller for quota purposes.
    pub async fn quota_context(&self, state: &AppState) -> AppResult<QuotaContext> {
        let policy = state.config.quota_policy();
        let Some(user) = &self.0 else {
            return Ok(QuotaContext::anonymous(policy));
        };
        let plan = user.plan(&state.pool).await?;
        Ok(QuotaContext {
            actor: ActorClass::from_plan(Some(plan)),
            user_id: Some(user.user_id),
            policy,
        })
    }
}
