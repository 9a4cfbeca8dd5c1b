//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement. Use these in route handlers to enforce
//! authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use roadwatch_core::error::CoreError;
use roadwatch_core::roles::ROLE_AUTHORITY;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `authority` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn authority_only(RequireAuthority(user): RequireAuthority) -> AppResult<Json<()>> {
///     // user is guaranteed to be an authority here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAuthority(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuthority {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_AUTHORITY {
            return Err(AppError::Core(CoreError::Forbidden(
                "Authority role required".into(),
            )));
        }
        Ok(RequireAuthority(user))
    }
}
