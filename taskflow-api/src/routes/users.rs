/// User management endpoints
///
/// # Endpoints
///
/// - `POST /api/users` - Create a user (admin, or read_write creating read_only)
/// - `GET /api/users` - List the users visible to the caller
/// - `GET /api/users/:id` - Get a user
/// - `PATCH /api/users/:id` - Update profile fields or role
/// - `DELETE /api/users/:id` - Deactivate a user (admin)
/// - `POST /api/users/:id/activate` - Reactivate a user (admin)
/// - `POST /api/users/:id/change-password` - Set a new password (admin)

use crate::{app::AppState, error::ApiResult, routes::MessageResponse};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use taskflow_shared::{
    auth::principal::Principal,
    models::user::User,
    services::{
        users::{ChangePasswordRequest, CreateUserRequest, UpdateUserRequest},
        Pagination,
    },
};
use uuid::Uuid;

/// Create a user
///
/// # Endpoint
///
/// ```text
/// POST /api/users
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "username": "carol",
///   "email": "carol@example.com",
///   "password": "password123",
///   "role": "read_only"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Username or email already registered
/// - `403 Forbidden`: Caller may not assign the requested role
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(req) = payload?;
    let user = state.users.create_user(&principal, req).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// List users
///
/// Admins see everyone, read_write users see read_write and read_only
/// accounts, read_only users see read_only accounts.
///
/// ```text
/// GET /api/users?skip=0&limit=50
/// ```
pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    page: Result<Query<Pagination>, QueryRejection>,
) -> ApiResult<Json<Vec<User>>> {
    let Query(page) = page?;
    Ok(Json(state.users.list_users(&principal, page).await?))
}

/// Get a user by ID
///
/// # Errors
///
/// - `403 Forbidden`: The target's role is not visible to the caller
/// - `404 Not Found`: No such user
pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    Ok(Json(state.users.get_user(&principal, id).await?))
}

/// Update a user
///
/// Accepts `email`, `first_name`, `last_name` and `role`. read_only callers
/// are refused; read_write callers may only set the read_only role.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    let Json(req) = payload?;

    Ok(Json(state.users.update_user(&principal, id, req).await?))
}

/// Deactivate a user
///
/// The row is kept; the account can no longer log in or use its tokens.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.users.deactivate_user(&principal, id).await?;

    Ok(Json(MessageResponse::new(format!("User {} deactivated", id))))
}

pub async fn activate_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.users.activate_user(&principal, id).await?;

    Ok(Json(MessageResponse::new(format!("User {} activated", id))))
}

/// Set a user's password
///
/// ```text
/// POST /api/users/:id/change-password
///
/// { "new_password": "newpassword123" }
/// ```
pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(req) = payload?;
    state.users.change_password(&principal, id, req).await?;

    Ok(Json(MessageResponse::new("Password updated")))
}
