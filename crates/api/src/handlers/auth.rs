//! Handlers for the `/auth` resource (signup, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use roadwatch_core::error::CoreError;
use roadwatch_core::roles::{is_valid_role, ROLE_CITIZEN};
use roadwatch_db::models::user::{CreateUser, UserResponse};
use roadwatch_db::repositories::UserRepo;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub password: String,
    /// `"citizen"` (default) or `"authority"`.
    pub role: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response returned by login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register a new account. Returns 201 with the public user representation.
/// Duplicate emails yield 409 via the `uq_users_email` constraint.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role = input.role.unwrap_or_else(|| ROLE_CITIZEN.to_string());
    if !is_valid_role(&role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown role: {role}"
        ))));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name,
            email: input.email.to_lowercase(),
            password_hash,
            role,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");
    Ok((StatusCode::CREATED, Json(user.to_response())))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Resolve the account. Missing user and wrong password produce the same
    // message so the endpoint does not leak which emails exist.
    let user = UserRepo::find_by_email(&state.pool, &input.email.to_lowercase())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let expires_in = state.config.jwt.access_token_expiry_mins * 60;

    Ok(Json(AuthResponse {
        access_token,
        expires_in,
        user: user.to_response(),
    }))
}
