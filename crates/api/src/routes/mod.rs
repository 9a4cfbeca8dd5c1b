pub mod auth;
pub mod health;
pub mod notification;
pub mod report;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                 register (public)
/// /auth/login                  login (public)
///
/// /reports                     submit (multipart, optional auth), list (authority)
/// /reports/{id}                get (owner / authority)
/// /reports/{id}/action         lifecycle action (authority)
/// /reports/{id}/notify         SMS the road authority (owner / authority)
///
/// /users/{id}/reports          a user's reports (self / authority)
///
/// /notifications               SMS delivery log (authority)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (signup, login).
        .nest("/auth", auth::router())
        // Report submission and lifecycle.
        .nest("/reports", report::router())
        // User-scoped report listings.
        .nest("/users", user::router())
        // SMS delivery log.
        .nest("/notifications", notification::router())
}
