//! Route definitions for the `/notifications` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET /  -> SMS delivery log (authority only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(notification::list))
}
