/// Database models for TaskFlow
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, roles and activation state
/// - `project`: Projects and their owners
/// - `membership`: Explicit project members (owner excluded)
/// - `task`: Tasks within projects
///
/// Models talk to PostgreSQL directly. Code outside the persistence layer
/// should go through [`crate::store`] instead.

pub mod membership;
pub mod project;
pub mod task;
pub mod user;
