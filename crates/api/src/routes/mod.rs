pub mod health;
pub mod hotspot;
pub mod page;
pub mod usage;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /page                          create (optional bearer)
/// /page/{slug}                   public view, rename (edit token)
/// /page/{slug}/image             attach image (edit token)
///
/// /hotspot                       create (edit token)
/// /hotspot/{id}                  update, delete (edit token)
///
/// /me/usage                      usage summary (bearer)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/page", page::router())
        .nest("/hotspot", hotspot::router())
        .nest("/me", usage::router())
}
