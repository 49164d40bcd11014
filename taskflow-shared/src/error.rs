/// Service-layer errors
///
/// Everything an entity service can fail with. The HTTP layer translates
/// each variant to a status code exactly once.

use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use crate::auth::{authorization::AuthzError, jwt::JwtError, password::PasswordError};
use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// A field that failed request validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Authorization engine decision (Forbidden / NotFound / InvalidInput)
    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// Duplicate username or email
    #[error("{0}")]
    Conflict(String),

    /// Target vanished between the authorization decision and the write
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User is not active")]
    Inactive,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", what))
    }

    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Store(other),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(field_errors(&errors))
    }
}

/// Flattens `validator` output into field/message pairs, sorted by field
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}
