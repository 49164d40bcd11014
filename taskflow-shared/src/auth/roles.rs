/// Role model
///
/// TaskFlow uses a fixed three-tier role hierarchy. Roles are global to a user
/// (not per-project); project-level access is layered on top via membership.
///
/// # Capability Table
///
/// | Capability                      | Admin | ReadWrite        | ReadOnly  |
/// |---------------------------------|-------|------------------|-----------|
/// | Mutate projects/tasks/members   | yes   | yes (if entitled)| no        |
/// | Assign roles when creating users| any   | `read_only` only | none      |
/// | View users with role            | any   | rw, ro           | ro        |
/// | Deactivate/activate users       | yes   | no               | no        |
///
/// # Example
///
/// ```
/// use taskflow_shared::auth::roles::Role;
///
/// assert!(Role::Admin.can_assign(Role::Admin));
/// assert!(Role::ReadWrite.can_assign(Role::ReadOnly));
/// assert!(!Role::ReadWrite.can_assign(Role::ReadWrite));
/// assert!(!Role::ReadOnly.can_mutate());
/// ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted access to every entity
    Admin,

    /// May create and modify the projects and tasks they are entitled to
    ReadWrite,

    /// May only read what they belong to
    ReadOnly,
}

impl Role {
    /// All roles, most privileged first
    pub const ALL: [Role; 3] = [Role::Admin, Role::ReadWrite, Role::ReadOnly];

    /// Gets role as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ReadWrite => "read_write",
            Role::ReadOnly => "read_only",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether this role may perform any create/update/delete operation.
    ///
    /// This is the read-only veto consulted before every mutating rule.
    pub fn can_mutate(&self) -> bool {
        !matches!(self, Role::ReadOnly)
    }

    /// Whether a principal with this role may give `requested` to a user
    /// (on create or update)
    pub fn can_assign(&self, requested: Role) -> bool {
        match self {
            Role::Admin => true,
            Role::ReadWrite => requested == Role::ReadOnly,
            Role::ReadOnly => false,
        }
    }

    /// Whether a principal with this role may see a user holding `target`
    pub fn can_view(&self, target: Role) -> bool {
        self.visible_roles().contains(&target)
    }

    /// Roles of the users this role may see
    pub fn visible_roles(&self) -> &'static [Role] {
        match self {
            Role::Admin => &Role::ALL,
            Role::ReadWrite => &[Role::ReadWrite, Role::ReadOnly],
            Role::ReadOnly => &[Role::ReadOnly],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "read_write" => Ok(Role::ReadWrite),
            "read_only" => Ok(Role::ReadOnly),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}
