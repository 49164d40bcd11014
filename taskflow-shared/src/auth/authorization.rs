/// Authorization engine
///
/// One function per operation. Each combines the principal's role, the
/// principal's relation to the target project, and resource ownership into
/// either the loaded target (allow) or an [`AuthzError`] naming why not.
///
/// # Evaluation Order
///
/// Mutating rules check, in order:
///
/// 1. the read-only veto ([`Role::can_mutate`])
/// 2. role-specific rules (admin bypass, assignable roles)
/// 3. ownership / membership
/// 4. existence of the target
///
/// Project mutations are owner-only, so a principal touching a project that
/// does not exist is told `Forbidden`, not `NotFound`. Rules that must load a
/// task to learn its project check existence as soon as the task is needed.
/// Project reads resolve existence first so a deleted project reads as
/// `NotFound` for everyone.
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::auth::authorization::{self, AuthzError};
/// use taskflow_shared::auth::principal::Principal;
/// use taskflow_shared::store::MemoryStore;
/// use uuid::Uuid;
///
/// # async fn example(principal: Principal, project_id: Uuid) -> Result<(), AuthzError> {
/// let store = MemoryStore::new();
/// let project = authorization::read_project(&store, &principal, project_id).await?;
/// println!("{} may read {}", principal.id, project.name);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::membership::{relation_to, Relation};
use super::principal::Principal;
use super::roles::Role;
use crate::models::{
    project::Project,
    task::{Task, UpdateTask},
    user::User,
};
use crate::store::{Store, StoreError};

/// Why an operation was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The read-only veto
    ReadOnlyRole { action: &'static str },

    /// Operation reserved to admins
    AdminRequired { action: &'static str },

    /// Operation reserved to the project owner
    NotOwner { action: &'static str },

    /// Principal neither owns nor belongs to the project
    NotMember,

    /// Principal may not hand out the requested role
    RoleNotAssignable { by: Role, requested: Role },

    /// Target user's role is outside what the principal may see
    UserNotVisible { viewer: Role },

    /// Only the creator or an admin may delete a task
    NotCreator,

    /// Only admins may list another user's tasks
    OtherUsersTasks,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::ReadOnlyRole { action } => write!(f, "read_only users cannot {}", action),
            Denial::AdminRequired { action } => write!(f, "Only admin users can {}", action),
            Denial::NotOwner { action } => write!(f, "Only the project owner can {}", action),
            Denial::NotMember => f.write_str("You are not a member of this project"),
            Denial::RoleNotAssignable { by, requested } => write!(
                f,
                "{} users can only assign the read_only role. Requested: {}",
                by, requested
            ),
            Denial::UserNotVisible { viewer: Role::ReadOnly } => {
                f.write_str("read_only users can only view other read_only users")
            }
            Denial::UserNotVisible { viewer } => write!(
                f,
                "{} users can only view read_write and read_only users",
                viewer
            ),
            Denial::NotCreator => {
                f.write_str("Only the task creator or an admin can delete this task")
            }
            Denial::OtherUsersTasks => f.write_str("You can only view your own tasks"),
        }
    }
}

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Principal may not perform the operation
    #[error("{0}")]
    Forbidden(Denial),

    /// Target does not exist
    #[error("{0}")]
    NotFound(String),

    /// Operation is permitted in principle but the request is semantically invalid
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthzError {
    pub fn not_found(what: &str) -> Self {
        AuthzError::NotFound(format!("{} not found", what))
    }
}

/// Who may change a task's status
///
/// `WritersOnly` applies the read-only veto that guards every other task
/// mutation. `AnyMember` lets any project member, read_only included, move a
/// task between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusUpdatePolicy {
    #[default]
    WritersOnly,
    AnyMember,
}

type AuthzResult<T> = Result<T, AuthzError>;

fn deny(principal: &Principal, denial: Denial) -> AuthzError {
    warn!(
        principal_id = %principal.id,
        role = %principal.role,
        reason = %denial,
        "Authorization denied"
    );
    AuthzError::Forbidden(denial)
}

fn require_writer(principal: &Principal, action: &'static str) -> AuthzResult<()> {
    if principal.role.can_mutate() {
        Ok(())
    } else {
        Err(deny(principal, Denial::ReadOnlyRole { action }))
    }
}

/// Gate for operations reserved to admins
pub fn require_admin(principal: &Principal, action: &'static str) -> AuthzResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(deny(principal, Denial::AdminRequired { action }))
    }
}

async fn require_project_member<S>(
    store: &S,
    principal: &Principal,
    project: &Project,
) -> AuthzResult<()>
where
    S: Store + ?Sized,
{
    if principal.is_admin() {
        return Ok(());
    }

    if relation_to(store, project, principal.id).await?.is_member() {
        Ok(())
    } else {
        Err(deny(principal, Denial::NotMember))
    }
}

async fn load_task<S: Store + ?Sized>(store: &S, task_id: Uuid) -> AuthzResult<Task> {
    store
        .find_task(task_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("Task"))
}

async fn load_project<S: Store + ?Sized>(store: &S, project_id: Uuid) -> AuthzResult<Project> {
    store
        .find_project(project_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("Project"))
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

pub fn create_project(principal: &Principal) -> AuthzResult<()> {
    require_writer(principal, "create projects")
}

/// Admin, or any member of the project
pub async fn read_project<S>(store: &S, principal: &Principal, project_id: Uuid) -> AuthzResult<Project>
where
    S: Store + ?Sized,
{
    let project = load_project(store, project_id).await?;
    require_project_member(store, principal, &project).await?;

    debug!(principal_id = %principal.id, project_id = %project.id, "Project read allowed");
    Ok(project)
}

/// Owner-only project mutation (update, delete, membership changes)
///
/// Admins are not exempt.
pub async fn manage_project<S>(
    store: &S,
    principal: &Principal,
    project_id: Uuid,
    action: &'static str,
) -> AuthzResult<Project>
where
    S: Store + ?Sized,
{
    require_writer(principal, action)?;

    match store.find_project(project_id).await? {
        Some(project) if project.owner_id == principal.id => {
            debug!(principal_id = %principal.id, project_id = %project.id, action, "Owner action allowed");
            Ok(project)
        }
        _ => Err(deny(principal, Denial::NotOwner { action })),
    }
}

pub async fn update_project<S>(store: &S, principal: &Principal, project_id: Uuid) -> AuthzResult<Project>
where
    S: Store + ?Sized,
{
    manage_project(store, principal, project_id, "update projects").await
}

pub async fn delete_project<S>(store: &S, principal: &Principal, project_id: Uuid) -> AuthzResult<Project>
where
    S: Store + ?Sized,
{
    manage_project(store, principal, project_id, "delete projects").await
}

/// Owner adds `member_id` to the project
///
/// The target may not be the owner, may not already be a member, and must
/// exist.
pub async fn add_member<S>(
    store: &S,
    principal: &Principal,
    project_id: Uuid,
    member_id: Uuid,
) -> AuthzResult<Project>
where
    S: Store + ?Sized,
{
    let project = manage_project(store, principal, project_id, "add members to projects").await?;

    if member_id == project.owner_id {
        return Err(AuthzError::InvalidInput(
            "The project owner is already a member".to_string(),
        ));
    }

    if store.is_explicit_member(project.id, member_id).await? {
        return Err(AuthzError::InvalidInput(
            "User is already a member of this project".to_string(),
        ));
    }

    if store.find_user(member_id).await?.is_none() {
        return Err(AuthzError::not_found("User"));
    }

    Ok(project)
}

/// Owner removes `member_id` from the project. The owner cannot be removed.
pub async fn remove_member<S>(
    store: &S,
    principal: &Principal,
    project_id: Uuid,
    member_id: Uuid,
) -> AuthzResult<Project>
where
    S: Store + ?Sized,
{
    let project =
        manage_project(store, principal, project_id, "remove members from projects").await?;

    if member_id == project.owner_id {
        return Err(AuthzError::InvalidInput(
            "Cannot remove the project owner".to_string(),
        ));
    }

    if !store.is_explicit_member(project.id, member_id).await? {
        return Err(AuthzError::NotFound(
            "User is not a member of this project".to_string(),
        ));
    }

    Ok(project)
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

async fn require_assignee_member<S>(
    store: &S,
    project: &Project,
    assignee: Uuid,
) -> AuthzResult<()>
where
    S: Store + ?Sized,
{
    if relation_to(store, project, assignee).await? == Relation::None {
        return Err(AuthzError::InvalidInput(
            "Assigned user must be a member of the project".to_string(),
        ));
    }
    Ok(())
}

/// Writer who is admin or project member; assignee (if any) must be a member
pub async fn create_task<S>(
    store: &S,
    principal: &Principal,
    project_id: Uuid,
    assigned_to_id: Option<Uuid>,
) -> AuthzResult<Project>
where
    S: Store + ?Sized,
{
    require_writer(principal, "create tasks")?;

    let project = match store.find_project(project_id).await? {
        Some(project) => project,
        None if principal.is_admin() => return Err(AuthzError::not_found("Project")),
        None => return Err(deny(principal, Denial::NotMember)),
    };
    require_project_member(store, principal, &project).await?;

    if let Some(assignee) = assigned_to_id {
        require_assignee_member(store, &project, assignee).await?;
    }

    Ok(project)
}

/// Admin, or any member of the task's project
pub async fn read_task<S>(store: &S, principal: &Principal, task_id: Uuid) -> AuthzResult<Task>
where
    S: Store + ?Sized,
{
    let task = load_task(store, task_id).await?;
    let project = load_project(store, task.project_id).await?;
    require_project_member(store, principal, &project).await?;

    Ok(task)
}

/// Writer who is admin or a member; a newly assigned user must be a member
pub async fn update_task<S>(
    store: &S,
    principal: &Principal,
    task_id: Uuid,
    update: &UpdateTask,
) -> AuthzResult<Task>
where
    S: Store + ?Sized,
{
    require_writer(principal, "update tasks")?;

    let task = load_task(store, task_id).await?;
    let project = load_project(store, task.project_id).await?;
    require_project_member(store, principal, &project).await?;

    if let Some(assignee) = update.new_assignee() {
        if task.assigned_to_id != Some(assignee) {
            require_assignee_member(store, &project, assignee).await?;
        }
    }

    Ok(task)
}

/// Admin or member; the read-only veto applies per `policy`
pub async fn update_task_status<S>(
    store: &S,
    principal: &Principal,
    task_id: Uuid,
    policy: StatusUpdatePolicy,
) -> AuthzResult<Task>
where
    S: Store + ?Sized,
{
    if policy == StatusUpdatePolicy::WritersOnly {
        require_writer(principal, "update task status")?;
    }

    let task = load_task(store, task_id).await?;
    let project = load_project(store, task.project_id).await?;
    require_project_member(store, principal, &project).await?;

    Ok(task)
}

/// Writer who is admin or the task's creator
pub async fn delete_task<S>(store: &S, principal: &Principal, task_id: Uuid) -> AuthzResult<Task>
where
    S: Store + ?Sized,
{
    require_writer(principal, "delete tasks")?;

    let task = load_task(store, task_id).await?;
    if principal.is_admin() || task.creator_id == principal.id {
        Ok(task)
    } else {
        Err(deny(principal, Denial::NotCreator))
    }
}

/// Same rule as reading the project
pub async fn list_project_tasks<S>(
    store: &S,
    principal: &Principal,
    project_id: Uuid,
) -> AuthzResult<Project>
where
    S: Store + ?Sized,
{
    read_project(store, principal, project_id).await
}

/// Admin, or the target user themselves
pub async fn list_user_tasks<S>(store: &S, principal: &Principal, user_id: Uuid) -> AuthzResult<User>
where
    S: Store + ?Sized,
{
    if !principal.is_admin() && principal.id != user_id {
        return Err(deny(principal, Denial::OtherUsersTasks));
    }

    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("User"))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Writer who may assign `requested`
pub fn create_user(principal: &Principal, requested: Role) -> AuthzResult<()> {
    require_writer(principal, "create users")?;

    if !principal.role.can_assign(requested) {
        return Err(deny(
            principal,
            Denial::RoleNotAssignable {
                by: principal.role,
                requested,
            },
        ));
    }
    Ok(())
}

/// Target must exist and hold a role the principal may see
pub async fn read_user<S>(store: &S, principal: &Principal, user_id: Uuid) -> AuthzResult<User>
where
    S: Store + ?Sized,
{
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("User"))?;

    if principal.role.can_view(user.role) {
        Ok(user)
    } else {
        Err(deny(
            principal,
            Denial::UserNotVisible {
                viewer: principal.role,
            },
        ))
    }
}

/// Roles a user listing is filtered to
pub fn visible_roles(principal: &Principal) -> &'static [Role] {
    principal.role.visible_roles()
}

/// Writer who may assign `requested_role` (if changing it); target must exist
pub async fn update_user<S>(
    store: &S,
    principal: &Principal,
    user_id: Uuid,
    requested_role: Option<Role>,
) -> AuthzResult<User>
where
    S: Store + ?Sized,
{
    require_writer(principal, "update users")?;

    if let Some(requested) = requested_role {
        if !principal.role.can_assign(requested) {
            return Err(deny(
                principal,
                Denial::RoleNotAssignable {
                    by: principal.role,
                    requested,
                },
            ));
        }
    }

    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("User"))
}

/// Admin-only account administration (deactivate, activate, set password)
pub async fn administer_user<S>(
    store: &S,
    principal: &Principal,
    user_id: Uuid,
    action: &'static str,
) -> AuthzResult<User>
where
    S: Store + ?Sized,
{
    require_admin(principal, action)?;

    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("User"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::CreateProject;
    use crate::models::task::{CreateTask, TaskPriority, TaskStatus};
    use crate::models::user::CreateUser;
    use crate::store::{MemoryStore, ProjectStore, TaskStore, UserStore};

    struct Fixture {
        store: MemoryStore,
        admin: Principal,
        owner: Principal,
        member: Principal,
        reader: Principal,
        outsider: Principal,
        project: Project,
        task: Task,
    }

    async fn principal(store: &MemoryStore, name: &str, role: Role) -> Principal {
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

    /// owner (rw) owns the project; member (rw) and reader (ro) belong to it;
    /// outsider (rw) does not. The task was created by member.
    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let admin = principal(&store, "admin", Role::Admin).await;
        let owner = principal(&store, "owner", Role::ReadWrite).await;
        let member = principal(&store, "member", Role::ReadWrite).await;
        let reader = principal(&store, "reader", Role::ReadOnly).await;
        let outsider = principal(&store, "outsider", Role::ReadWrite).await;

        let project = store
            .create_project(CreateProject {
                name: "Launch".to_string(),
                description: None,
                owner_id: owner.id,
            })
            .await
            .unwrap();
        store.add_member(project.id, member.id).await.unwrap();
        store.add_member(project.id, reader.id).await.unwrap();

        let task = store
            .create_task(CreateTask {
                title: "Draft plan".to_string(),
                description: None,
                priority: TaskPriority::Medium,
                status: TaskStatus::Pending,
                due_date: None,
                project_id: project.id,
                creator_id: member.id,
                assigned_to_id: None,
            })
            .await
            .unwrap();

        Fixture {
            store,
            admin,
            owner,
            member,
            reader,
            outsider,
            project,
            task,
        }
    }

    fn is_forbidden<T: fmt::Debug>(result: &AuthzResult<T>) -> bool {
        matches!(result, Err(AuthzError::Forbidden(_)))
    }

    #[tokio::test]
    async fn test_read_only_vetoed_on_every_mutation() {
        let f = fixture().await;
        let s = &f.store;
        let r = &f.reader;

        // The reader is a project member, yet every mutation is refused
        assert!(is_forbidden(&create_project(r)));
        assert!(is_forbidden(&create_task(s, r, f.project.id, None).await));
        assert!(is_forbidden(&update_task(s, r, f.task.id, &UpdateTask::default()).await));
        assert!(is_forbidden(
            &update_task_status(s, r, f.task.id, StatusUpdatePolicy::WritersOnly).await
        ));
        assert!(is_forbidden(&delete_task(s, r, f.task.id).await));
        assert!(is_forbidden(&update_project(s, r, f.project.id).await));
        assert!(is_forbidden(&delete_project(s, r, f.project.id).await));
        assert!(is_forbidden(&add_member(s, r, f.project.id, f.outsider.id).await));
        assert!(is_forbidden(&remove_member(s, r, f.project.id, f.member.id).await));
        assert!(is_forbidden(&create_user(r, Role::ReadOnly)));
        assert!(is_forbidden(&update_user(s, r, r.id, None).await));
    }

    #[tokio::test]
    async fn test_read_only_veto_precedes_ownership() {
        let store = MemoryStore::new();
        let reader = principal(&store, "ro_owner", Role::ReadOnly).await;
        let project = store
            .create_project(CreateProject {
                name: "Legacy".to_string(),
                description: None,
                owner_id: reader.id,
            })
            .await
            .unwrap();

        match delete_project(&store, &reader, project.id).await {
            Err(AuthzError::Forbidden(Denial::ReadOnlyRole { .. })) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_policy_any_member_lets_reader_through() {
        let f = fixture().await;

        let allowed =
            update_task_status(&f.store, &f.reader, f.task.id, StatusUpdatePolicy::AnyMember).await;
        assert!(allowed.is_ok());

        let outsider = update_task_status(
            &f.store,
            &f.outsider,
            f.task.id,
            StatusUpdatePolicy::AnyMember,
        )
        .await;
        assert!(is_forbidden(&outsider));
    }

    #[tokio::test]
    async fn test_project_read_rules() {
        let f = fixture().await;

        assert!(read_project(&f.store, &f.owner, f.project.id).await.is_ok());
        assert!(read_project(&f.store, &f.reader, f.project.id).await.is_ok());
        assert!(read_project(&f.store, &f.admin, f.project.id).await.is_ok());
        assert!(is_forbidden(&read_project(&f.store, &f.outsider, f.project.id).await));

        assert!(matches!(
            read_project(&f.store, &f.owner, Uuid::new_v4()).await,
            Err(AuthzError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_project_mutation_is_owner_only() {
        let f = fixture().await;

        assert!(update_project(&f.store, &f.owner, f.project.id).await.is_ok());
        assert!(is_forbidden(&update_project(&f.store, &f.member, f.project.id).await));
        assert!(is_forbidden(&delete_project(&f.store, &f.admin, f.project.id).await));

        // Unknown project: nobody owns it
        assert!(is_forbidden(&delete_project(&f.store, &f.owner, Uuid::new_v4()).await));
    }

    #[tokio::test]
    async fn test_add_member_rules() {
        let f = fixture().await;
        let s = &f.store;

        assert!(add_member(s, &f.owner, f.project.id, f.outsider.id).await.is_ok());
        assert!(is_forbidden(&add_member(s, &f.member, f.project.id, f.outsider.id).await));

        assert!(matches!(
            add_member(s, &f.owner, f.project.id, f.owner.id).await,
            Err(AuthzError::InvalidInput(_))
        ));
        match add_member(s, &f.owner, f.project.id, f.member.id).await {
            Err(AuthzError::InvalidInput(msg)) => assert!(msg.contains("already a member")),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            add_member(s, &f.owner, f.project.id, Uuid::new_v4()).await,
            Err(AuthzError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_member_rules() {
        let f = fixture().await;
        let s = &f.store;

        assert!(remove_member(s, &f.owner, f.project.id, f.member.id).await.is_ok());
        assert!(matches!(
            remove_member(s, &f.owner, f.project.id, f.owner.id).await,
            Err(AuthzError::InvalidInput(_))
        ));
        assert!(matches!(
            remove_member(s, &f.owner, f.project.id, f.outsider.id).await,
            Err(AuthzError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_task_rules() {
        let f = fixture().await;
        let s = &f.store;

        assert!(create_task(s, &f.member, f.project.id, None).await.is_ok());
        assert!(create_task(s, &f.admin, f.project.id, None).await.is_ok());
        assert!(is_forbidden(&create_task(s, &f.outsider, f.project.id, None).await));

        // Assigning to the owner, an explicit member, or a read-only member is fine
        assert!(create_task(s, &f.member, f.project.id, Some(f.owner.id)).await.is_ok());
        assert!(create_task(s, &f.owner, f.project.id, Some(f.reader.id)).await.is_ok());
        assert!(matches!(
            create_task(s, &f.owner, f.project.id, Some(f.outsider.id)).await,
            Err(AuthzError::InvalidInput(_))
        ));

        assert!(matches!(
            create_task(s, &f.admin, Uuid::new_v4(), None).await,
            Err(AuthzError::NotFound(_))
        ));
        assert!(is_forbidden(&create_task(s, &f.member, Uuid::new_v4(), None).await));
    }

    #[tokio::test]
    async fn test_update_task_assignee_must_be_member() {
        let f = fixture().await;
        let s = &f.store;

        let to_outsider = UpdateTask {
            assigned_to_id: Some(Some(f.outsider.id)),
            ..Default::default()
        };
        assert!(matches!(
            update_task(s, &f.owner, f.task.id, &to_outsider).await,
            Err(AuthzError::InvalidInput(_))
        ));

        let unassign = UpdateTask {
            assigned_to_id: Some(None),
            ..Default::default()
        };
        assert!(update_task(s, &f.owner, f.task.id, &unassign).await.is_ok());

        assert!(is_forbidden(
            &update_task(s, &f.outsider, f.task.id, &UpdateTask::default()).await
        ));
        assert!(matches!(
            update_task(s, &f.owner, Uuid::new_v4(), &UpdateTask::default()).await,
            Err(AuthzError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_task_creator_or_admin() {
        let f = fixture().await;

        assert!(delete_task(&f.store, &f.member, f.task.id).await.is_ok());
        assert!(delete_task(&f.store, &f.admin, f.task.id).await.is_ok());

        // Owning the project does not make you the task's creator
        match delete_task(&f.store, &f.owner, f.task.id).await {
            Err(AuthzError::Forbidden(Denial::NotCreator)) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_task_rules() {
        let f = fixture().await;

        assert!(read_task(&f.store, &f.reader, f.task.id).await.is_ok());
        assert!(read_task(&f.store, &f.admin, f.task.id).await.is_ok());
        assert!(is_forbidden(&read_task(&f.store, &f.outsider, f.task.id).await));
    }

    #[tokio::test]
    async fn test_list_user_tasks_rules() {
        let f = fixture().await;

        assert!(list_user_tasks(&f.store, &f.reader, f.reader.id).await.is_ok());
        assert!(list_user_tasks(&f.store, &f.admin, f.reader.id).await.is_ok());
        assert!(is_forbidden(&list_user_tasks(&f.store, &f.member, f.reader.id).await));
        assert!(matches!(
            list_user_tasks(&f.store, &f.admin, Uuid::new_v4()).await,
            Err(AuthzError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_user_rules() {
        let f = fixture().await;
        let s = &f.store;

        assert!(create_user(&f.admin, Role::Admin).is_ok());
        assert!(create_user(&f.owner, Role::ReadOnly).is_ok());
        match create_user(&f.owner, Role::ReadWrite) {
            Err(AuthzError::Forbidden(Denial::RoleNotAssignable { requested, .. })) => {
                assert_eq!(requested, Role::ReadWrite)
            }
            other => panic!("unexpected: {:?}", other),
        }

        assert!(update_user(s, &f.owner, f.reader.id, Some(Role::ReadOnly)).await.is_ok());
        assert!(is_forbidden(&update_user(s, &f.owner, f.reader.id, Some(Role::Admin)).await));
        assert!(matches!(
            update_user(s, &f.admin, Uuid::new_v4(), None).await,
            Err(AuthzError::NotFound(_))
        ));

        assert!(read_user(s, &f.reader, f.reader.id).await.is_ok());
        assert!(is_forbidden(&read_user(s, &f.reader, f.owner.id).await));
        assert!(is_forbidden(&read_user(s, &f.owner, f.admin.id).await));
        assert!(read_user(s, &f.owner, f.reader.id).await.is_ok());
        assert!(read_user(s, &f.admin, f.admin.id).await.is_ok());

        assert_eq!(visible_roles(&f.reader), &[Role::ReadOnly]);

        assert!(administer_user(s, &f.admin, f.reader.id, "deactivate users").await.is_ok());
        match administer_user(s, &f.owner, f.reader.id, "deactivate users").await {
            Err(AuthzError::Forbidden(denial)) => {
                assert_eq!(denial.to_string(), "Only admin users can deactivate users")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_denial_messages() {
        assert_eq!(
            Denial::ReadOnlyRole { action: "create projects" }.to_string(),
            "read_only users cannot create projects"
        );
        assert_eq!(
            Denial::UserNotVisible { viewer: Role::ReadOnly }.to_string(),
            "read_only users can only view other read_only users"
        );
        assert_eq!(
            Denial::RoleNotAssignable {
                by: Role::ReadWrite,
                requested: Role::Admin
            }
            .to_string(),
            "read_write users can only assign the read_only role. Requested: admin"
        );
    }
}
