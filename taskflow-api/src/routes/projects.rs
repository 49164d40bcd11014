/// Project endpoints
///
/// # Endpoints
///
/// - `POST /api/projects` - Create a project owned by the caller
/// - `GET /api/projects` - Projects the caller owns or belongs to
/// - `GET /api/projects/:id` - Project with members and task summaries
/// - `PATCH /api/projects/:id` - Update a project (owner)
/// - `DELETE /api/projects/:id` - Delete a project and its tasks (owner)
/// - `POST /api/projects/:id/members` - Add a member (owner)
/// - `DELETE /api/projects/:id/members/:member_id` - Remove a member (owner)

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
    models::project::Project,
    services::{
        projects::{
            AddMemberRequest, CreateProjectRequest, MemberSummary, ProjectDetails,
            UpdateProjectRequest,
        },
        Pagination,
    },
};
use uuid::Uuid;

/// Create a project
///
/// # Endpoint
///
/// ```text
/// POST /api/projects
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "name": "Website", "description": "Relaunch" }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: read_only callers
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let Json(req) = payload?;
    let project = state.projects.create_project(&principal, req).await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// List the caller's projects
///
/// Admins get the same view as everyone else: projects they own or were
/// added to.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    page: Result<Query<Pagination>, QueryRejection>,
) -> ApiResult<Json<Vec<Project>>> {
    let Query(page) = page?;
    Ok(Json(state.projects.list_projects(&principal, page).await?))
}

/// Get project details
///
/// # Response
///
/// ```json
/// {
///   "id": "uuid",
///   "name": "Website",
///   "owner_id": "uuid",
///   "members": [{ "id": "uuid", "username": "bob", ... }],
///   "tasks": [{ "id": "uuid", "title": "Write copy" }]
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the owner or a member
/// - `404 Not Found`: No such project
pub async fn get_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<ProjectDetails>> {
    let Path(id) = id?;
    Ok(Json(state.projects.get_project(&principal, id).await?))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<Json<Project>> {
    let Path(id) = id?;
    let Json(req) = payload?;

    Ok(Json(state.projects.update_project(&principal, id, req).await?))
}

/// Delete a project
///
/// Tasks and memberships go with it.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.projects.delete_project(&principal, id).await?;

    Ok(Json(MessageResponse::new("Project deleted")))
}

/// Add a member
///
/// ```text
/// POST /api/projects/:id/members
///
/// { "member_id": "uuid" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Already a member, or the user is the owner
/// - `403 Forbidden`: Caller is not the owner
/// - `404 Not Found`: No such user
pub async fn add_member(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AddMemberRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MemberSummary>)> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let member = state.projects.add_member(&principal, id, req).await?;

    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path((id, member_id)) = ids?;
    state.projects.remove_member(&principal, id, member_id).await?;

    Ok(Json(MessageResponse::new("Member removed")))
}
