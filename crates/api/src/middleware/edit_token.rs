//! Edit-token extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use hotspot_core::capability::MISSING_TOKEN_MESSAGE;
use hotspot_core::error::CoreError;

use crate::error::AppError;

/// Header carrying the page capability.
pub const EDIT_TOKEN_HEADER: &str = "x-edit-token";

/// The edit token presented with a gated mutation.
///
/// A missing or blank header is rejected with 401 before any lookup happens.
/// Whether the token is *correct* is decided later, against the stored page.
#[derive(Debug, Clone)]
pub struct EditToken(pub String);

impl EditToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for EditToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(EDIT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| EditToken(v.to_string()))
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized(MISSING_TOKEN_MESSAGE.into())))
    }
}
