/// PostgreSQL-backed store
///
/// Thin delegation to the model methods. Cascades are enforced by foreign
/// keys (`ON DELETE CASCADE`), so every trait method maps to one statement.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ProjectStore, Store, StoreResult, TaskStore, UserStore};
use crate::auth::roles::Role;
use crate::db::pool;
use crate::models::{
    membership::ProjectMember,
    project::{CreateProject, Project, UpdateProject},
    task::{CreateTask, Task, TaskFilter, UpdateTask},
    user::{CreateUser, UpdateUser, User},
};

/// Store over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        Ok(User::update(&self.pool, id, data).await?)
    }

    async fn list_users(&self, roles: &[Role], skip: i64, limit: i64) -> StoreResult<Vec<User>> {
        Ok(User::list_by_roles(&self.pool, roles, skip, limit).await?)
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, data).await?)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn update_project(&self, id: Uuid, data: UpdateProject) -> StoreResult<Option<Project>> {
        Ok(Project::update(&self.pool, id, data).await?)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Project::delete(&self.pool, id).await?)
    }

    async fn list_projects_for_user(
        &self,
        user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> StoreResult<Vec<Project>> {
        Ok(Project::list_for_user(&self.pool, user_id, skip, limit).await?)
    }

    async fn add_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(ProjectMember::add(&self.pool, project_id, user_id).await?)
    }

    async fn remove_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(ProjectMember::remove(&self.pool, project_id, user_id).await?)
    }

    async fn is_explicit_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(ProjectMember::exists(&self.pool, project_id, user_id).await?)
    }

    async fn list_members(&self, project_id: Uuid) -> StoreResult<Vec<User>> {
        Ok(ProjectMember::list_users(&self.pool, project_id).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, data).await?)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        skip: i64,
        limit: i64,
    ) -> StoreResult<Vec<Task>> {
        Ok(Task::list(&self.pool, filter, skip, limit).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(pool::health_check(&self.pool).await?)
    }
}
