/// Entity services
///
/// Each operation takes the resolved [`Principal`](crate::auth::principal::Principal),
/// asks the authorization engine once, then performs one logical store
/// operation. Services hold no per-request state and are cheap to clone.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskflow_shared::services::{ProjectService, TokenSettings, UserService};
/// use taskflow_shared::services::users::LoginRequest;
/// use taskflow_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// let users = UserService::new(
///     store.clone(),
///     TokenSettings::new("secret-key-at-least-32-bytes-long!!", 60),
/// );
/// let projects = ProjectService::new(store);
///
/// let login = users
///     .login(LoginRequest {
///         username: "alice".to_string(),
///         password: "password123".to_string(),
///     })
///     .await?;
/// println!("token: {}", login.access_token);
/// # Ok(())
/// # }
/// ```

use serde::Deserialize;

use crate::error::{FieldError, ServiceError, ServiceResult};

pub mod projects;
pub mod tasks;
pub mod users;

pub use projects::ProjectService;
pub use tasks::TaskService;
pub use users::{TokenSettings, UserService};

/// `skip` / `limit` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
        }
    }

    /// Applies defaults and rejects out-of-range values
    ///
    /// `skip` must be ≥ 0 and `limit` in `1..=max_limit`.
    pub fn resolve(&self, default_limit: i64, max_limit: i64) -> ServiceResult<(i64, i64)> {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(default_limit);

        let mut errors = Vec::new();
        if skip < 0 {
            errors.push(FieldError::new("skip", "skip must be greater than or equal to 0"));
        }
        if !(1..=max_limit).contains(&limit) {
            errors.push(FieldError::new(
                "limit",
                format!("limit must be between 1 and {}", max_limit),
            ));
        }

        if errors.is_empty() {
            Ok((skip, limit))
        } else {
            Err(ServiceError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        assert_eq!(Pagination::default().resolve(10, 100).unwrap(), (0, 10));
        assert_eq!(Pagination::new(5, 100).resolve(10, 100).unwrap(), (5, 100));
    }

    #[test]
    fn test_pagination_out_of_range() {
        assert!(Pagination::new(-1, 10).resolve(10, 100).is_err());
        assert!(Pagination::new(0, 0).resolve(10, 100).is_err());
        assert!(Pagination::new(0, 201).resolve(50, 200).is_err());

        match Pagination::new(-1, 0).resolve(10, 100) {
            Err(ServiceError::Validation(details)) => assert_eq!(details.len(), 2),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
