use axum::routing::get;
use axum::Router;

use crate::handlers::usage;
use crate::state::AppState;

/// Routes mounted at `/me`. Requires a bearer token.
///
/// ```text
/// GET    /usage    get_usage
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/usage", get(usage::get_usage))
}
