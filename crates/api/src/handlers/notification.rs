//! Handlers for the `/notifications` resource.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use roadwatch_db::models::notification::Notification;
use roadwatch_db::repositories::NotificationRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuthority;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default and maximum page size for notification listings.
const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/notifications?limit=
///
/// Authority-only view of recent SMS delivery attempts, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireAuthority(_user): RequireAuthority,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, DEFAULT_LIMIT);
    let notifications = NotificationRepo::list(&state.pool, limit).await?;
    Ok(Json(DataResponse {
        data: notifications,
    }))
}
