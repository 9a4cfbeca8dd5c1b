//! Route definitions for the `/reports` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// POST /              -> submit (multipart, optional auth)
/// GET  /              -> list (authority only)
/// GET  /{id}          -> get (owner / authority)
/// POST /{id}/action   -> lifecycle action (authority only)
/// POST /{id}/notify   -> SMS road authority (owner / authority)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(report::submit).get(report::list))
        .route("/{id}", get(report::get_by_id))
        .route("/{id}/action", post(report::action))
        .route("/{id}/notify", post(report::notify))
}
