/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a new read_write user
/// - `POST /api/auth/login` - Exchange credentials for an access token
/// - `GET /api/auth/me` - The authenticated user
/// - `GET /api/auth/validate-token` - Confirm the presented token is usable

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::principal::Principal,
    models::user::User,
    services::users::{LoginRequest, LoginResponse, RegisterRequest, UserSummary},
};

/// Token validation response
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateTokenResponse {
    pub valid: bool,
    pub user: UserSummary,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "secret123",
///   "first_name": "Alice"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Username or email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(req) = payload?;
    let user = state.users.register(req).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// { "username": "alice", "password": "secret123" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "token_type": "bearer",
///   "user": { "id": "uuid", "username": "alice", "email": "...", "role": "read_write" }
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid username or password, or inactive user
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    Ok(Json(state.users.login(req).await?))
}

/// The authenticated user's account
pub async fn me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.current_user(&principal).await?))
}

/// Reaching this handler means the auth layer accepted the token
pub async fn validate_token(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<ValidateTokenResponse>> {
    let user = state.users.current_user(&principal).await?;

    Ok(Json(ValidateTokenResponse {
        valid: true,
        user: UserSummary::from(&user),
    }))
}
