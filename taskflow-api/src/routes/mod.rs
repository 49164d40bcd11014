/// API route handlers, organized by resource
///
/// - `health`: liveness and store connectivity
/// - `auth`: registration, login and token introspection
/// - `users`: account management
/// - `projects`: projects and their membership
/// - `tasks`: tasks within projects
///
/// Handlers only extract, delegate to a service and shape the response.
/// Authorization lives in the services.

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

use serde::{Deserialize, Serialize};

/// Body for operations with nothing else to return
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
