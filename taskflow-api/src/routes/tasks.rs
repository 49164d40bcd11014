/// Task endpoints
///
/// # Endpoints
///
/// - `POST /api/tasks` - Create a task in a project
/// - `GET /api/tasks/project/:project_id` - Tasks of a project
/// - `GET /api/tasks/my-tasks` - Tasks assigned to the caller
/// - `GET /api/tasks/user/:user_id` - Tasks assigned to a user
/// - `GET /api/tasks/:id` - Get a task
/// - `PATCH /api/tasks/:id` - Update a task
/// - `PATCH /api/tasks/:id/status` - Change only the status
/// - `DELETE /api/tasks/:id` - Delete a task (creator or admin)
///
/// Listings accept `status`, `priority`, `skip` and `limit` on the query
/// string. The project listing also filters on `assigned_to_id` and
/// `creator_id`; the per-user listings on `project_id`.

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
    models::task::{Task, UpdateTask},
    services::tasks::{CreateTaskRequest, TaskQuery, UpdateStatusRequest},
};
use uuid::Uuid;

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "title": "Write copy",
///   "project_id": "uuid",
///   "priority": "high",
///   "assigned_to_id": "uuid"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Assignee is not a member of the project
/// - `403 Forbidden`: read_only caller, or not a project member
/// - `404 Not Found`: No such project (admins only; others get 403)
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(req) = payload?;
    let task = state.tasks.create_task(&principal, req).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List a project's tasks
///
/// ```text
/// GET /api/tasks/project/:project_id?status=pending&priority=high&skip=0&limit=50
/// ```
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    project_id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Path(project_id) = project_id?;
    let Query(query) = query?;

    Ok(Json(
        state
            .tasks
            .list_project_tasks(&principal, project_id, query)
            .await?,
    ))
}

pub async fn list_my_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(query) = query?;
    Ok(Json(state.tasks.list_my_tasks(&principal, query).await?))
}

/// List tasks assigned to a user
///
/// # Errors
///
/// - `403 Forbidden`: Non-admin asking for someone else's tasks
/// - `404 Not Found`: No such user
pub async fn list_user_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    user_id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Path(user_id) = user_id?;
    let Query(query) = query?;

    Ok(Json(
        state
            .tasks
            .list_user_tasks(&principal, user_id, query)
            .await?,
    ))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    Ok(Json(state.tasks.get_task(&principal, id).await?))
}

/// Update a task
///
/// Absent fields are left alone; `null` clears `description`, `due_date`
/// or `assigned_to_id`.
///
/// # Errors
///
/// - `400 Bad Request`: New assignee is not a member of the project
/// - `403 Forbidden`: read_only caller, or not a project member
/// - `404 Not Found`: No such task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    let Json(update) = payload?;

    Ok(Json(state.tasks.update_task(&principal, id, update).await?))
}

/// Change a task's status
///
/// ```text
/// PATCH /api/tasks/:id/status
///
/// { "status": "in_progress" }
/// ```
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    let Json(req) = payload?;

    Ok(Json(
        state.tasks.update_task_status(&principal, id, req).await?,
    ))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.tasks.delete_task(&principal, id).await?;

    Ok(Json(MessageResponse::new("Task deleted")))
}
