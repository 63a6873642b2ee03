//! Route definitions for hotspots.

use axum::routing::{patch, post};
use axum::Router;

use crate::handlers::hotspot;
use crate::state::AppState;

/// Routes mounted at `/hotspot`. All require an edit token.
///
/// ```text
/// POST   /        create_hotspot
/// PATCH  /{id}    update_hotspot
/// DELETE /{id}    delete_hotspot
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(hotspot::create_hotspot))
        .route(
            "/{id}",
            patch(hotspot::update_hotspot).delete(hotspot::delete_hotspot),
        )
}
