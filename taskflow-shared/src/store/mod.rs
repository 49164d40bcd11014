/// Persistence contracts
///
/// The authorization engine and entity services never touch the database
/// directly; they depend on these traits. Two implementations ship:
///
/// - [`PgStore`]: PostgreSQL via the sqlx models in [`crate::models`]
/// - [`MemoryStore`]: in-process maps, for tests and local demos
///
/// Every method is one logical operation. Cascades (project delete removing
/// tasks and memberships) happen inside the store, atomically.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskflow_shared::store::{MemoryStore, Store};
///
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::roles::Role;
use crate::models::{
    project::{CreateProject, Project, UpdateProject},
    task::{CreateTask, Task, TaskFilter, UpdateTask},
    user::{CreateUser, UpdateUser, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness rule was violated (duplicate username or email)
    #[error("{0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let message = match db_err.constraint() {
                    Some(c) if c.contains("username") => "Username already registered",
                    Some(c) if c.contains("email") => "Email already registered",
                    _ => "User with username or email already exists",
                };
                return StoreError::Conflict(message.to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Duplicate username or email is a `Conflict`.
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Applies a partial update. Returns None if the user doesn't exist.
    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>>;

    /// Lists users whose role is one of `roles`, oldest first
    async fn list_users(&self, roles: &[Role], skip: i64, limit: i64) -> StoreResult<Vec<User>>;
}

/// Project and membership persistence
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create_project(&self, data: CreateProject) -> StoreResult<Project>;

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    async fn update_project(&self, id: Uuid, data: UpdateProject) -> StoreResult<Option<Project>>;

    /// Deletes a project with its tasks and memberships. False if absent.
    async fn delete_project(&self, id: Uuid) -> StoreResult<bool>;

    /// Projects the user owns or explicitly belongs to, newest first
    async fn list_projects_for_user(
        &self,
        user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> StoreResult<Vec<Project>>;

    /// Adds an explicit member. False if the membership already existed.
    async fn add_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    /// Removes an explicit member. False if there was nothing to remove.
    async fn remove_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    /// Membership in the explicit set only; ownership is not considered
    async fn is_explicit_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    /// Explicit members in join order
    async fn list_members(&self, project_id: Uuid) -> StoreResult<Vec<User>>;
}

/// Task persistence
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>>;

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;

    /// Tasks matching every set field of `filter`, newest first
    async fn list_tasks(&self, filter: &TaskFilter, skip: i64, limit: i64)
        -> StoreResult<Vec<Task>>;
}

/// The full persistence surface the services need
#[async_trait]
pub trait Store: UserStore + ProjectStore + TaskStore {
    /// Connectivity check used by the health endpoint
    async fn ping(&self) -> StoreResult<()>;
}
