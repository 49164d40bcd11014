/// Membership oracle
///
/// Answers "how does this user relate to this project?" against current
/// store state. Nothing is cached; each authorization decision asks again.
///
/// The owner is always a member, even though the owner never appears in the
/// explicit member set. A project that does not exist has no owner and no
/// members.

use uuid::Uuid;

use crate::models::project::Project;
use crate::store::{ProjectStore, StoreResult};

/// A user's standing in a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Owner,
    Member,
    None,
}

impl Relation {
    pub fn is_owner(&self) -> bool {
        matches!(self, Relation::Owner)
    }

    /// Owners count as members
    pub fn is_member(&self) -> bool {
        matches!(self, Relation::Owner | Relation::Member)
    }
}

/// Relation of `user_id` to an already loaded project
pub async fn relation_to<S>(store: &S, project: &Project, user_id: Uuid) -> StoreResult<Relation>
where
    S: ProjectStore + ?Sized,
{
    if project.owner_id == user_id {
        return Ok(Relation::Owner);
    }

    if store.is_explicit_member(project.id, user_id).await? {
        Ok(Relation::Member)
    } else {
        Ok(Relation::None)
    }
}

/// Relation of `user_id` to the project with `project_id`
pub async fn relation<S>(store: &S, project_id: Uuid, user_id: Uuid) -> StoreResult<Relation>
where
    S: ProjectStore + ?Sized,
{
    match store.find_project(project_id).await? {
        Some(project) => relation_to(store, &project, user_id).await,
        None => Ok(Relation::None),
    }
}

/// True iff the project exists and `user_id` owns it
pub async fn is_owner<S>(store: &S, project_id: Uuid, user_id: Uuid) -> StoreResult<bool>
where
    S: ProjectStore + ?Sized,
{
    Ok(relation(store, project_id, user_id).await?.is_owner())
}

/// True iff `user_id` owns or explicitly belongs to the project
pub async fn is_member<S>(store: &S, project_id: Uuid, user_id: Uuid) -> StoreResult<bool>
where
    S: ProjectStore + ?Sized,
{
    Ok(relation(store, project_id, user_id).await?.is_member())
}
