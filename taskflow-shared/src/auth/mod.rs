/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and length rules
/// - [`jwt`]: signed access tokens
/// - [`roles`]: the three-role model and its capability predicates
/// - [`principal`]: resolves an `Authorization` header to a [`principal::Principal`]
/// - [`membership`]: owner/member relation of a user to a project
/// - [`authorization`]: per-operation allow/deny decisions
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::auth::password::{hash_password, verify_password};
/// use taskflow_shared::auth::jwt::{create_token, validate_token, Claims};
/// use taskflow_shared::auth::roles::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "alice", Role::ReadWrite);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// let decoded = validate_token(&token, "secret-key-at-least-32-bytes-long!!")?;
/// assert_eq!(decoded.username.as_deref(), Some("alice"));
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod membership;
pub mod password;
pub mod principal;
pub mod roles;
