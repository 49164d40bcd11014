/// Project service
///
/// Projects are owner-managed: only the owner updates, deletes or changes
/// membership. The owner is never stored in the explicit member set.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::Pagination;
use crate::auth::{
    authorization::{self, AuthzError},
    principal::Principal,
};
use crate::error::{field_errors, FieldError, ServiceError, ServiceResult};
use crate::models::{
    project::{CreateProject, Project, UpdateProject},
    task::{double_option, TaskFilter, TaskSummary},
    user::User,
};
use crate::store::{ProjectStore, Store, TaskStore, UserStore};

const DEFAULT_LIST_LIMIT: i64 = 10;
const MAX_LIST_LIMIT: i64 = 100;
const DESCRIPTION_MAX: usize = 500;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 3, max = 100, message = "Name must be 3-100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// Absent fields are left alone; `"description": null` clears the description
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 3, max = 100, message = "Name must be 3-100 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl UpdateProjectRequest {
    fn check(&self) -> ServiceResult<()> {
        let mut details = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors(&e),
        };

        if let Some(Some(description)) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX {
                details.push(FieldError::new(
                    "description",
                    "Description must be at most 500 characters",
                ));
            }
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(details))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddMemberRequest {
    pub member_id: Uuid,
}

/// A project member as shown in project details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<&User> for MemberSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Project with its explicit members (owner excluded) and task summaries
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: Project,
    pub members: Vec<MemberSummary>,
    pub tasks: Vec<TaskSummary>,
}

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn Store>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The principal becomes the owner
    pub async fn create_project(
        &self,
        principal: &Principal,
        req: CreateProjectRequest,
    ) -> ServiceResult<Project> {
        req.validate()?;
        authorization::create_project(principal)?;

        let project = self
            .store
            .create_project(CreateProject {
                name: req.name,
                description: req.description,
                owner_id: principal.id,
            })
            .await?;

        info!(project_id = %project.id, owner_id = %principal.id, "Project created");
        Ok(project)
    }

    /// Projects the principal owns or belongs to, newest first
    pub async fn list_projects(
        &self,
        principal: &Principal,
        page: Pagination,
    ) -> ServiceResult<Vec<Project>> {
        let (skip, limit) = page.resolve(DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT)?;

        Ok(self
            .store
            .list_projects_for_user(principal.id, skip, limit)
            .await?)
    }

    pub async fn get_project(
        &self,
        principal: &Principal,
        project_id: Uuid,
    ) -> ServiceResult<ProjectDetails> {
        let project = authorization::read_project(self.store.as_ref(), principal, project_id).await?;

        let members = self.store.list_members(project.id).await?;
        let filter = TaskFilter {
            project_id: Some(project.id),
            ..Default::default()
        };
        let tasks = self.store.list_tasks(&filter, 0, i64::MAX).await?;

        Ok(ProjectDetails {
            project,
            members: members.iter().map(MemberSummary::from).collect(),
            tasks: tasks.iter().map(TaskSummary::from).collect(),
        })
    }

    pub async fn update_project(
        &self,
        principal: &Principal,
        project_id: Uuid,
        req: UpdateProjectRequest,
    ) -> ServiceResult<Project> {
        req.check()?;
        authorization::update_project(self.store.as_ref(), principal, project_id).await?;

        let update = UpdateProject {
            name: req.name,
            description: req.description,
        };
        let project = self
            .store
            .update_project(project_id, update)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;

        info!(project_id = %project.id, "Project updated");
        Ok(project)
    }

    /// Removes the project together with its tasks and memberships
    pub async fn delete_project(&self, principal: &Principal, project_id: Uuid) -> ServiceResult<()> {
        authorization::delete_project(self.store.as_ref(), principal, project_id).await?;

        if !self.store.delete_project(project_id).await? {
            return Err(ServiceError::not_found("Project"));
        }

        info!(project_id = %project_id, deleted_by = %principal.id, "Project deleted");
        Ok(())
    }

    /// Returns the added user
    pub async fn add_member(
        &self,
        principal: &Principal,
        project_id: Uuid,
        req: AddMemberRequest,
    ) -> ServiceResult<MemberSummary> {
        authorization::add_member(self.store.as_ref(), principal, project_id, req.member_id)
            .await?;

        // A concurrent add of the same user lands here
        if !self.store.add_member(project_id, req.member_id).await? {
            return Err(AuthzError::InvalidInput(
                "User is already a member of this project".to_string(),
            )
            .into());
        }

        let member = self
            .store
            .find_user(req.member_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        info!(project_id = %project_id, user_id = %member.id, "Member added");
        Ok(MemberSummary::from(&member))
    }

    pub async fn remove_member(
        &self,
        principal: &Principal,
        project_id: Uuid,
        member_id: Uuid,
    ) -> ServiceResult<()> {
        authorization::remove_member(self.store.as_ref(), principal, project_id, member_id).await?;

        if !self.store.remove_member(project_id, member_id).await? {
            return Err(ServiceError::NotFound(
                "User is not a member of this project".to_string(),
            ));
        }

        info!(project_id = %project_id, user_id = %member_id, "Member removed");
        Ok(())
    }
}
