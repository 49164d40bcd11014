/// In-memory store for testing and demos
///
/// Mirrors the PostgreSQL schema's guarantees without a database:
///
/// - unique usernames and emails (`StoreError::Conflict`)
/// - unique `(project, user)` memberships
/// - project delete cascades to tasks and memberships
/// - same orderings as the SQL queries (insertion order stands in for
///   `created_at`)
///
/// All state sits behind a single `RwLock`, so each trait call is atomic.
///
/// # Example
///
/// ```
/// use taskflow_shared::store::{MemoryStore, UserStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// assert!(store.find_user(Uuid::new_v4()).await?.is_none());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ProjectStore, Store, StoreError, StoreResult, TaskStore, UserStore};
use crate::auth::roles::Role;
use crate::models::{
    project::{CreateProject, Project, UpdateProject},
    task::{CreateTask, Task, TaskFilter, UpdateTask},
    user::{CreateUser, UpdateUser, User},
};

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    projects: Vec<Project>,
    members: Vec<Membership>,
    tasks: Vec<Task>,
}

/// Vec position is join order
#[derive(Debug, Clone)]
struct Membership {
    project_id: Uuid,
    user_id: Uuid,
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T>(items: impl Iterator<Item = T>, skip: i64, limit: i64) -> Vec<T> {
    items
        .skip(skip.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;

        if inner.users.iter().any(|u| u.username == data.username) {
            return Err(StoreError::Conflict("Username already registered".to_string()));
        }
        if inner.email_taken(&data.email, None) {
            return Err(StoreError::Conflict("Email already registered".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            is_active: true,
            first_name: data.first_name,
            last_name: data.last_name,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;

        if let Some(email) = &data.email {
            if inner.email_taken(email, Some(id)) {
                return Err(StoreError::Conflict("Email already registered".to_string()));
            }
        }

        Ok(inner.users.iter_mut().find(|u| u.id == id).map(|user| {
            data.apply_to(user);
            user.clone()
        }))
    }

    async fn list_users(&self, roles: &[Role], skip: i64, limit: i64) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(page(
            inner.users.iter().filter(|u| roles.contains(&u.role)).cloned(),
            skip,
            limit,
        ))
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        let mut inner = self.inner.write().await;

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };
        inner.projects.push(project.clone());

        Ok(project)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let inner = self.inner.read().await;
        Ok(inner.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn update_project(&self, id: Uuid, data: UpdateProject) -> StoreResult<Option<Project>> {
        let mut inner = self.inner.write().await;
        Ok(inner.projects.iter_mut().find(|p| p.id == id).map(|project| {
            data.apply_to(project);
            project.clone()
        }))
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;

        let before = inner.projects.len();
        inner.projects.retain(|p| p.id != id);
        if inner.projects.len() == before {
            return Ok(false);
        }

        inner.tasks.retain(|t| t.project_id != id);
        inner.members.retain(|m| m.project_id != id);

        Ok(true)
    }

    async fn list_projects_for_user(
        &self,
        user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> StoreResult<Vec<Project>> {
        let inner = self.inner.read().await;
        let visible = inner.projects.iter().rev().filter(|p| {
            p.owner_id == user_id
                || inner
                    .members
                    .iter()
                    .any(|m| m.project_id == p.id && m.user_id == user_id)
        });
        Ok(page(visible.cloned(), skip, limit))
    }

    async fn add_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;

        if inner
            .members
            .iter()
            .any(|m| m.project_id == project_id && m.user_id == user_id)
        {
            return Ok(false);
        }

        inner.members.push(Membership { project_id, user_id });

        Ok(true)
    }

    async fn remove_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;

        let before = inner.members.len();
        inner
            .members
            .retain(|m| !(m.project_id == project_id && m.user_id == user_id));

        Ok(inner.members.len() < before)
    }

    async fn is_explicit_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .members
            .iter()
            .any(|m| m.project_id == project_id && m.user_id == user_id))
    }

    async fn list_members(&self, project_id: Uuid) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .members
            .iter()
            .filter(|m| m.project_id == project_id)
            .filter_map(|m| inner.users.iter().find(|u| u.id == m.user_id).cloned())
            .collect())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut inner = self.inner.write().await;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            priority: data.priority,
            status: data.status,
            due_date: data.due_date,
            project_id: data.project_id,
            creator_id: data.creator_id,
            assigned_to_id: data.assigned_to_id,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.push(task.clone());

        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>> {
        let mut inner = self.inner.write().await;
        Ok(inner.tasks.iter_mut().find(|t| t.id == id).map(|task| {
            data.apply_to(task);
            task.clone()
        }))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.id != id);
        Ok(inner.tasks.len() < before)
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        skip: i64,
        limit: i64,
    ) -> StoreResult<Vec<Task>> {
        let inner = self.inner.read().await;
        Ok(page(
            inner.tasks.iter().rev().filter(|t| filter.matches(t)).cloned(),
            skip,
            limit,
        ))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
