//! Request body extraction with errors in the API's own JSON shape.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json<T>` whose rejection is an [`AppError`], so a malformed or
/// mistyped body answers `{error, code}` like every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
