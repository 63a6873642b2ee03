//! Route definitions for pages.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::page;
use crate::state::AppState;

/// Routes mounted at `/page`.
///
/// ```text
/// POST   /                 create_page (optional bearer)
/// GET    /{slug}           get_page (public)
/// PATCH  /{slug}           update_page (edit token)
/// PUT    /{slug}/image     attach_image (edit token)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(page::create_page))
        .route("/{slug}", get(page::get_page).patch(page::update_page))
        .route("/{slug}/image", put(page::attach_image))
}
