//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET /{id}/reports  -> a user's reports (self / authority)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/reports", get(report::list_for_user))
}
