//! # TaskFlow Shared Library
//!
//! Role-based access control and entity services for the TaskFlow
//! task-management API.
//!
//! ## Module Organization
//!
//! - `auth`: roles, tokens, passwords, principal resolution, membership and
//!   authorization decisions
//! - `models`: database rows and their sqlx queries
//! - `store`: persistence traits with PostgreSQL and in-memory backends
//! - `services`: user, project and task operations
//! - `db`: connection pool and migrations
//! - `error`: service-layer error type

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the TaskFlow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
