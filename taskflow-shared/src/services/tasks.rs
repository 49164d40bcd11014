/// Task service
///
/// Any project member with write access creates and edits tasks; only the
/// creator (or an admin) deletes them. Who may change a task's status is
/// governed by the configured [`StatusUpdatePolicy`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::Pagination;
use crate::auth::{
    authorization::{self, StatusUpdatePolicy},
    principal::Principal,
};
use crate::error::{FieldError, ServiceError, ServiceResult};
use crate::models::task::{CreateTask, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTask};
use crate::store::{Store, TaskStore};

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 200;

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 150;
const DESCRIPTION_MAX: usize = 2000;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 3, max = 150, message = "Title must be 3-150 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// Defaults to `medium`
    #[serde(default)]
    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,

    pub project_id: Uuid,

    pub assigned_to_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TaskStatus,
}

/// Listing filters and paging, as accepted on the query string
///
/// Which filters apply depends on the listing: the project listing ignores
/// `project_id`, the per-user listings ignore `assigned_to_id` and
/// `creator_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<Uuid>,
    pub assigned_to_id: Option<Uuid>,
    pub creator_id: Option<Uuid>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl TaskQuery {
    fn page(&self) -> ServiceResult<(i64, i64)> {
        Pagination {
            skip: self.skip,
            limit: self.limit,
        }
        .resolve(DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT)
    }
}

/// Length rules for a partial update (only fields being set are checked)
fn validate_update(update: &UpdateTask) -> ServiceResult<()> {
    if update.is_empty() {
        return Err(ServiceError::invalid_field(
            "body",
            "At least one field must be provided",
        ));
    }

    let mut errors = Vec::new();

    if let Some(title) = &update.title {
        let len = title.chars().count();
        if !(TITLE_MIN..=TITLE_MAX).contains(&len) {
            errors.push(FieldError::new("title", "Title must be 3-150 characters"));
        }
    }

    if let Some(Some(description)) = &update.description {
        if description.chars().count() > DESCRIPTION_MAX {
            errors.push(FieldError::new(
                "description",
                "Description must be at most 2000 characters",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors))
    }
}

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
    status_policy: StatusUpdatePolicy,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>, status_policy: StatusUpdatePolicy) -> Self {
        Self {
            store,
            status_policy,
        }
    }

    /// The principal is recorded as the creator
    pub async fn create_task(&self, principal: &Principal, req: CreateTaskRequest) -> ServiceResult<Task> {
        req.validate()?;
        authorization::create_task(self.store.as_ref(), principal, req.project_id, req.assigned_to_id)
            .await?;

        let task = self
            .store
            .create_task(CreateTask {
                title: req.title,
                description: req.description,
                priority: req.priority.unwrap_or_default(),
                status: TaskStatus::default(),
                due_date: req.due_date,
                project_id: req.project_id,
                creator_id: principal.id,
                assigned_to_id: req.assigned_to_id,
            })
            .await?;

        info!(
            task_id = %task.id,
            project_id = %task.project_id,
            creator_id = %principal.id,
            "Task created"
        );
        Ok(task)
    }

    pub async fn get_task(&self, principal: &Principal, task_id: Uuid) -> ServiceResult<Task> {
        Ok(authorization::read_task(self.store.as_ref(), principal, task_id).await?)
    }

    /// Filters: status, priority, assigned_to_id, creator_id
    pub async fn list_project_tasks(
        &self,
        principal: &Principal,
        project_id: Uuid,
        query: TaskQuery,
    ) -> ServiceResult<Vec<Task>> {
        let (skip, limit) = query.page()?;
        let project =
            authorization::list_project_tasks(self.store.as_ref(), principal, project_id).await?;

        let filter = TaskFilter {
            project_id: Some(project.id),
            status: query.status,
            priority: query.priority,
            assigned_to_id: query.assigned_to_id,
            creator_id: query.creator_id,
        };
        Ok(self.store.list_tasks(&filter, skip, limit).await?)
    }

    /// Tasks assigned to `user_id`. Filters: status, priority, project_id
    pub async fn list_user_tasks(
        &self,
        principal: &Principal,
        user_id: Uuid,
        query: TaskQuery,
    ) -> ServiceResult<Vec<Task>> {
        let (skip, limit) = query.page()?;
        let user = authorization::list_user_tasks(self.store.as_ref(), principal, user_id).await?;

        let filter = TaskFilter {
            project_id: query.project_id,
            status: query.status,
            priority: query.priority,
            assigned_to_id: Some(user.id),
            creator_id: None,
        };
        Ok(self.store.list_tasks(&filter, skip, limit).await?)
    }

    /// Tasks assigned to the principal
    pub async fn list_my_tasks(&self, principal: &Principal, query: TaskQuery) -> ServiceResult<Vec<Task>> {
        self.list_user_tasks(principal, principal.id, query).await
    }

    pub async fn update_task(
        &self,
        principal: &Principal,
        task_id: Uuid,
        update: UpdateTask,
    ) -> ServiceResult<Task> {
        validate_update(&update)?;
        authorization::update_task(self.store.as_ref(), principal, task_id, &update).await?;

        let task = self
            .store
            .update_task(task_id, update)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task"))?;

        info!(task_id = %task.id, updated_by = %principal.id, "Task updated");
        Ok(task)
    }

    pub async fn update_task_status(
        &self,
        principal: &Principal,
        task_id: Uuid,
        req: UpdateStatusRequest,
    ) -> ServiceResult<Task> {
        authorization::update_task_status(self.store.as_ref(), principal, task_id, self.status_policy)
            .await?;

        let update = UpdateTask {
            status: Some(req.status),
            ..Default::default()
        };
        let task = self
            .store
            .update_task(task_id, update)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task"))?;

        info!(task_id = %task.id, status = %task.status.as_str(), "Task status changed");
        Ok(task)
    }

    pub async fn delete_task(&self, principal: &Principal, task_id: Uuid) -> ServiceResult<()> {
        authorization::delete_task(self.store.as_ref(), principal, task_id).await?;

        if !self.store.delete_task(task_id).await? {
            return Err(ServiceError::not_found("Task"));
        }

        info!(task_id = %task_id, deleted_by = %principal.id, "Task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authorization::AuthzError;
    use crate::auth::roles::Role;
    use crate::models::project::CreateProject;
    use crate::models::user::CreateUser;
    use crate::store::{MemoryStore, ProjectStore, UserStore};

    struct Setup {
        service: TaskService,
        alice: Principal,
        bob: Principal,
        carol: Principal,
        project_id: Uuid,
    }

    async fn user(store: &MemoryStore, name: &str, role: Role) -> Principal {
        let user = store
            .create_user(CreateUser {
                username: name.to_string(),
                email: format!("{}@example.com", name),
                password_hash: "hash".to_string(),
                role,
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap();
        Principal::from(&user)
    }

    /// alice (rw) owns the project, bob (ro) is a member, carol (rw) is not
    async fn setup(policy: StatusUpdatePolicy) -> Setup {
        let store = Arc::new(MemoryStore::new());
        let alice = user(&store, "alice", Role::ReadWrite).await;
        let bob = user(&store, "bob", Role::ReadOnly).await;
        let carol = user(&store, "carol", Role::ReadWrite).await;

        let project = store
            .create_project(CreateProject {
                name: "Launch".to_string(),
                description: None,
                owner_id: alice.id,
            })
            .await
            .unwrap();
        store.add_member(project.id, bob.id).await.unwrap();

        Setup {
            service: TaskService::new(store, policy),
            alice,
            bob,
            carol,
            project_id: project.id,
        }
    }

    fn create_req(project_id: Uuid, assignee: Option<Uuid>) -> CreateTaskRequest {
        CreateTaskRequest {
            title: "Write launch notes".to_string(),
            description: None,
            priority: None,
            due_date: None,
            project_id,
            assigned_to_id: assignee,
        }
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let s = setup(StatusUpdatePolicy::default()).await;
        let task = s
            .service
            .create_task(&s.alice, create_req(s.project_id, Some(s.bob.id)))
            .await
            .unwrap();

        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.creator_id, s.alice.id);
        assert_eq!(task.assigned_to_id, Some(s.bob.id));
    }

    #[tokio::test]
    async fn test_assignee_must_be_member() {
        let s = setup(StatusUpdatePolicy::default()).await;
        assert!(matches!(
            s.service
                .create_task(&s.alice, create_req(s.project_id, Some(s.carol.id)))
                .await,
            Err(ServiceError::Authz(AuthzError::InvalidInput(_)))
        ));
    }

    #[tokio::test]
    async fn test_read_only_member_reads_but_cannot_write() {
        let s = setup(StatusUpdatePolicy::WritersOnly).await;
        let task = s
            .service
            .create_task(&s.alice, create_req(s.project_id, None))
            .await
            .unwrap();

        assert!(s.service.get_task(&s.bob, task.id).await.is_ok());
        assert!(matches!(
            s.service.create_task(&s.bob, create_req(s.project_id, None)).await,
            Err(ServiceError::Authz(AuthzError::Forbidden(_)))
        ));
        assert!(matches!(
            s.service
                .update_task_status(&s.bob, task.id, UpdateStatusRequest { status: TaskStatus::Review })
                .await,
            Err(ServiceError::Authz(AuthzError::Forbidden(_)))
        ));
        assert!(matches!(
            s.service.delete_task(&s.bob, task.id).await,
            Err(ServiceError::Authz(AuthzError::Forbidden(_)))
        ));
    }

    #[tokio::test]
    async fn test_any_member_policy_allows_read_only_status_change() {
        let s = setup(StatusUpdatePolicy::AnyMember).await;
        let task = s
            .service
            .create_task(&s.alice, create_req(s.project_id, None))
            .await
            .unwrap();

        let updated = s
            .service
            .update_task_status(&s.bob, task.id, UpdateStatusRequest { status: TaskStatus::Completed })
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_fields() {
        let s = setup(StatusUpdatePolicy::default()).await;
        let task = s
            .service
            .create_task(&s.alice, create_req(s.project_id, Some(s.bob.id)))
            .await
            .unwrap();

        let update = UpdateTask {
            title: Some("Polish launch notes".to_string()),
            priority: Some(TaskPriority::High),
            assigned_to_id: Some(None),
            ..Default::default()
        };
        let updated = s.service.update_task(&s.alice, task.id, update).await.unwrap();
        assert_eq!(updated.title, "Polish launch notes");
        assert_eq!(updated.priority, TaskPriority::High);
        assert_eq!(updated.assigned_to_id, None);

        let too_short = UpdateTask {
            title: Some("ab".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            s.service.update_task(&s.alice, task.id, too_short).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let s = setup(StatusUpdatePolicy::default()).await;
        let task = s
            .service
            .create_task(&s.alice, create_req(s.project_id, None))
            .await
            .unwrap();

        match s.service.update_task(&s.alice, task.id, UpdateTask::default()).await {
            Err(ServiceError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "body");
            }
            other => panic!("expected validation error, got {:?}", other.map(|t| t.id)),
        }
    }

    #[tokio::test]
    async fn test_listings() {
        let s = setup(StatusUpdatePolicy::default()).await;
        let assigned = s
            .service
            .create_task(&s.alice, create_req(s.project_id, Some(s.bob.id)))
            .await
            .unwrap();
        s.service
            .create_task(&s.alice, create_req(s.project_id, None))
            .await
            .unwrap();

        let all = s
            .service
            .list_project_tasks(&s.bob, s.project_id, TaskQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let filtered = s
            .service
            .list_project_tasks(
                &s.alice,
                s.project_id,
                TaskQuery {
                    assigned_to_id: Some(s.bob.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);

        let mine = s.service.list_my_tasks(&s.bob, TaskQuery::default()).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, assigned.id);

        assert!(matches!(
            s.service.list_user_tasks(&s.alice, s.bob.id, TaskQuery::default()).await,
            Err(ServiceError::Authz(AuthzError::Forbidden(_)))
        ));
        assert!(matches!(
            s.service
                .list_project_tasks(&s.carol, s.project_id, TaskQuery::default())
                .await,
            Err(ServiceError::Authz(AuthzError::Forbidden(_)))
        ));
    }

    #[tokio::test]
    async fn test_creator_deletes() {
        let s = setup(StatusUpdatePolicy::default()).await;
        let task = s
            .service
            .create_task(&s.alice, create_req(s.project_id, None))
            .await
            .unwrap();

        s.service.delete_task(&s.alice, task.id).await.unwrap();
        assert!(matches!(
            s.service.get_task(&s.alice, task.id).await,
            Err(ServiceError::Authz(AuthzError::NotFound(_)))
        ));
    }
}
