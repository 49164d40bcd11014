/// User service: registration, login and account administration
///
/// Visibility and role-assignment rules come from
/// [`authorization`](crate::auth::authorization); this module only sequences
/// validation, the decision and the store call.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use super::Pagination;
use crate::auth::{
    authorization,
    jwt::{self, Claims},
    password::{self, MIN_ADMIN_SET_LENGTH, MIN_REGISTRATION_LENGTH},
    principal::Principal,
    roles::Role,
};
use crate::error::{field_errors, FieldError, ServiceError, ServiceResult};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::store::{Store, StoreError, UserStore};

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 100;

/// Token signing parameters used by login
#[derive(Debug, Clone)]
pub struct TokenSettings {
    secret: String,
    expiration_minutes: i64,
}

impl TokenSettings {
    pub fn new(secret: impl Into<String>, expiration_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_minutes,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,

    #[validate(length(max = 50, message = "First name must be at most 50 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 50, message = "Last name must be at most 50 characters"))]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public view of a user embedded in the login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserSummary,
}

/// Account creation by an admin or read_write user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,

    /// Defaults to `read_write`
    #[serde(default)]
    pub role: Option<Role>,

    #[validate(length(max = 50, message = "First name must be at most 50 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 50, message = "Last name must be at most 50 characters"))]
    pub last_name: Option<String>,
}

/// Only these four fields may change through an update
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 50, message = "First name must be at most 50 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 50, message = "Last name must be at most 50 characters"))]
    pub last_name: Option<String>,

    pub role: Option<Role>,
}

impl UpdateUserRequest {
    fn into_update(self) -> UpdateUser {
        UpdateUser {
            email: self.email,
            first_name: self.first_name.map(Some),
            last_name: self.last_name.map(Some),
            role: self.role,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

/// Runs derive validation plus the password length window in one pass
fn validate_with_password<T: Validate>(
    request: &T,
    field: &str,
    password: &str,
    min: usize,
) -> ServiceResult<()> {
    let mut details = match request.validate() {
        Ok(()) => Vec::new(),
        Err(e) => field_errors(&e),
    };

    if let Err(message) = password::validate_password_length(password, min) {
        details.push(FieldError::new(field, message));
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(details))
    }
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    tokens: TokenSettings,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenSettings) -> Self {
        Self { store, tokens }
    }

    /// Public self-registration. New accounts are always `read_write`.
    pub async fn register(&self, req: RegisterRequest) -> ServiceResult<User> {
        validate_with_password(&req, "password", &req.password, MIN_REGISTRATION_LENGTH)?;

        let user = self
            .store
            .create_user(CreateUser {
                username: req.username,
                email: req.email,
                password_hash: password::hash_password(&req.password)?,
                role: Role::ReadWrite,
                first_name: req.first_name,
                last_name: req.last_name,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verifies credentials and issues an access token
    ///
    /// Unknown username and wrong password are indistinguishable to the caller.
    pub async fn login(&self, req: LoginRequest) -> ServiceResult<LoginResponse> {
        let user = match self.store.find_user_by_username(&req.username).await? {
            Some(user) => user,
            None => {
                debug!(username = %req.username, "Login for unknown username");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        if !password::verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        if !user.is_active {
            warn!(user_id = %user.id, "Login attempt by inactive user");
            return Err(ServiceError::Inactive);
        }

        let claims = Claims::with_expiration(
            user.id,
            &user.username,
            user.role,
            Duration::minutes(self.tokens.expiration_minutes),
        );
        let access_token = jwt::create_token(&claims, &self.tokens.secret)?;

        info!(user_id = %user.id, "User logged in");
        Ok(LoginResponse {
            access_token,
            token_type: "bearer".to_string(),
            user: UserSummary::from(&user),
        })
    }

    /// The principal's own account
    pub async fn current_user(&self, principal: &Principal) -> ServiceResult<User> {
        self.store
            .find_user(principal.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    pub async fn create_user(
        &self,
        principal: &Principal,
        req: CreateUserRequest,
    ) -> ServiceResult<User> {
        validate_with_password(&req, "password", &req.password, MIN_ADMIN_SET_LENGTH)?;

        let role = req.role.unwrap_or(Role::ReadWrite);
        authorization::create_user(principal, role)?;

        let user = self
            .store
            .create_user(CreateUser {
                username: req.username,
                email: req.email,
                password_hash: password::hash_password(&req.password)?,
                role,
                first_name: req.first_name,
                last_name: req.last_name,
            })
            .await?;

        info!(
            created_by = %principal.id,
            user_id = %user.id,
            role = %user.role,
            "User created"
        );
        Ok(user)
    }

    pub async fn get_user(&self, principal: &Principal, user_id: Uuid) -> ServiceResult<User> {
        Ok(authorization::read_user(self.store.as_ref(), principal, user_id).await?)
    }

    /// Users whose role the principal may see
    pub async fn list_users(
        &self,
        principal: &Principal,
        page: Pagination,
    ) -> ServiceResult<Vec<User>> {
        let (skip, limit) = page.resolve(DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT)?;
        let roles = authorization::visible_roles(principal);

        Ok(self.store.list_users(roles, skip, limit).await?)
    }

    pub async fn update_user(
        &self,
        principal: &Principal,
        user_id: Uuid,
        req: UpdateUserRequest,
    ) -> ServiceResult<User> {
        req.validate()?;
        let role = req.role;
        let update = req.into_update();
        if update.is_empty() {
            return Err(ServiceError::invalid_field(
                "body",
                "At least one of these fields is required: email, first_name, last_name, role",
            ));
        }

        authorization::update_user(self.store.as_ref(), principal, user_id, role).await?;

        let user = self
            .store
            .update_user(user_id, update)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        info!(updated_by = %principal.id, user_id = %user.id, "User updated");
        Ok(user)
    }

    /// Soft delete: the row stays with `is_active = false`
    pub async fn deactivate_user(&self, principal: &Principal, user_id: Uuid) -> ServiceResult<User> {
        self.set_active(principal, user_id, false, "delete users").await
    }

    pub async fn activate_user(&self, principal: &Principal, user_id: Uuid) -> ServiceResult<User> {
        self.set_active(principal, user_id, true, "activate users").await
    }

    async fn set_active(
        &self,
        principal: &Principal,
        user_id: Uuid,
        active: bool,
        action: &'static str,
    ) -> ServiceResult<User> {
        authorization::administer_user(self.store.as_ref(), principal, user_id, action).await?;

        let user = self
            .store
            .update_user(
                user_id,
                UpdateUser {
                    is_active: Some(active),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        info!(by = %principal.id, user_id = %user.id, is_active = active, "User activation changed");
        Ok(user)
    }

    /// Admin sets another user's password
    pub async fn change_password(
        &self,
        principal: &Principal,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> ServiceResult<()> {
        password::validate_password_length(&req.new_password, MIN_ADMIN_SET_LENGTH)
            .map_err(|message| ServiceError::invalid_field("new_password", message))?;

        authorization::administer_user(self.store.as_ref(), principal, user_id, "change passwords")
            .await?;

        self.store
            .update_user(
                user_id,
                UpdateUser {
                    password_hash: Some(password::hash_password(&req.new_password)?),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        info!(by = %principal.id, user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Creates the bootstrap admin unless `username` already exists
    ///
    /// Returns the new user, or None when nothing was created.
    pub async fn seed_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<Option<User>> {
        if self.store.find_user_by_username(username).await?.is_some() {
            debug!(username, "Admin user already present");
            return Ok(None);
        }

        let created = self
            .store
            .create_user(CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: password::hash_password(password)?,
                role: Role::Admin,
                first_name: None,
                last_name: None,
            })
            .await;

        match created {
            Ok(user) => {
                info!(user_id = %user.id, username, "Seeded admin user");
                Ok(Some(user))
            }
            // Another instance seeded first
            Err(StoreError::Conflict(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authorization::{AuthzError, Denial};
    use crate::store::MemoryStore;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::new()), TokenSettings::new(SECRET, 60))
    }

    fn register_req(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "password123".to_string(),
            first_name: None,
            last_name: None,
        }
    }

    fn create_req(username: &str, role: Option<Role>) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "password123".to_string(),
            role,
            first_name: None,
            last_name: None,
        }
    }

    async fn admin(service: &UserService) -> Principal {
        let user = service
            .seed_admin("admin", "admin@taskflow.local", "adminpass")
            .await
            .unwrap()
            .unwrap();
        Principal::from(&user)
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let service = service();
        let user = service.register(register_req("alice")).await.unwrap();
        assert_eq!(user.role, Role::ReadWrite);
        assert!(user.is_active);
        assert_ne!(user.password_hash, "password123");

        let login = service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.token_type, "bearer");
        assert_eq!(login.user.id, user.id);

        let claims = jwt::validate_token(&login.access_token, SECRET).unwrap();
        assert_eq!(claims.sub, Some(user.id.to_string()));
        assert_eq!(claims.role, Some(Role::ReadWrite));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = service();
        let mut req = register_req("al");
        req.password = "12345".to_string();
        req.email = "not-an-email".to_string();

        match service.register(req).await {
            Err(ServiceError::Validation(details)) => {
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert!(fields.contains(&"username"));
                assert!(fields.contains(&"email"));
                assert!(fields.contains(&"password"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict() {
        let service = service();
        service.register(register_req("alice")).await.unwrap();

        assert!(matches!(
            service.register(register_req("alice")).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_login_failures() {
        let service = service();
        let admin = admin(&service).await;
        let user = service.register(register_req("alice")).await.unwrap();

        let bad_password = service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "wrong-password".to_string(),
            })
            .await;
        assert!(matches!(bad_password, Err(ServiceError::InvalidCredentials)));

        let unknown = service
            .login(LoginRequest {
                username: "nobody".to_string(),
                password: "password123".to_string(),
            })
            .await;
        assert!(matches!(unknown, Err(ServiceError::InvalidCredentials)));

        service.deactivate_user(&admin, user.id).await.unwrap();
        let inactive = service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "password123".to_string(),
            })
            .await;
        assert!(matches!(inactive, Err(ServiceError::Inactive)));
    }

    #[tokio::test]
    async fn test_read_write_may_only_create_read_only() {
        let service = service();
        let alice = Principal::from(&service.register(register_req("alice")).await.unwrap());

        let created = service
            .create_user(&alice, create_req("bob", Some(Role::ReadOnly)))
            .await
            .unwrap();
        assert_eq!(created.role, Role::ReadOnly);

        // Omitting the role means read_write, which alice cannot grant
        let denied = service.create_user(&alice, create_req("carol", None)).await;
        assert!(matches!(
            denied,
            Err(ServiceError::Authz(AuthzError::Forbidden(Denial::RoleNotAssignable { .. })))
        ));
    }

    #[tokio::test]
    async fn test_create_user_requires_eight_char_password() {
        let service = service();
        let admin = admin(&service).await;
        let mut req = create_req("bob", Some(Role::ReadOnly));
        req.password = "1234567".to_string();

        match service.create_user(&admin, req).await {
            Err(ServiceError::Validation(details)) => assert_eq!(details[0].field, "password"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_users_is_visibility_filtered() {
        let service = service();
        let admin = admin(&service).await;
        let alice = Principal::from(&service.register(register_req("alice")).await.unwrap());
        let bob = service
            .create_user(&admin, create_req("bob", Some(Role::ReadOnly)))
            .await
            .unwrap();
        let bob = Principal::from(&bob);

        let seen_by_admin = service.list_users(&admin, Pagination::default()).await.unwrap();
        assert_eq!(seen_by_admin.len(), 3);

        let seen_by_alice = service.list_users(&alice, Pagination::default()).await.unwrap();
        assert_eq!(seen_by_alice.len(), 2);
        assert!(seen_by_alice.iter().all(|u| u.role != Role::Admin));

        let seen_by_bob = service.list_users(&bob, Pagination::default()).await.unwrap();
        assert_eq!(seen_by_bob.len(), 1);
        assert_eq!(seen_by_bob[0].id, bob.id);
    }

    #[tokio::test]
    async fn test_update_user_rules() {
        let service = service();
        let admin = admin(&service).await;
        let alice = Principal::from(&service.register(register_req("alice")).await.unwrap());
        let bob = service
            .create_user(&admin, create_req("bob", Some(Role::ReadOnly)))
            .await
            .unwrap();

        let empty = service
            .update_user(&admin, bob.id, UpdateUserRequest::default())
            .await;
        assert!(matches!(empty, Err(ServiceError::Validation(_))));

        let promote = UpdateUserRequest {
            role: Some(Role::ReadWrite),
            ..Default::default()
        };
        assert!(matches!(
            service.update_user(&alice, bob.id, promote.clone()).await,
            Err(ServiceError::Authz(AuthzError::Forbidden(_)))
        ));

        let updated = service.update_user(&admin, bob.id, promote).await.unwrap();
        assert_eq!(updated.role, Role::ReadWrite);

        let rename = UpdateUserRequest {
            first_name: Some("Robert".to_string()),
            ..Default::default()
        };
        let updated = service.update_user(&alice, bob.id, rename).await.unwrap();
        assert_eq!(updated.first_name.as_deref(), Some("Robert"));
    }

    #[tokio::test]
    async fn test_deactivate_keeps_row() {
        let service = service();
        let admin = admin(&service).await;
        let alice = service.register(register_req("alice")).await.unwrap();

        let deactivated = service.deactivate_user(&admin, alice.id).await.unwrap();
        assert!(!deactivated.is_active);

        let still_there = service.get_user(&admin, alice.id).await.unwrap();
        assert!(!still_there.is_active);

        let reactivated = service.activate_user(&admin, alice.id).await.unwrap();
        assert!(reactivated.is_active);
    }

    #[tokio::test]
    async fn test_admin_only_operations() {
        let service = service();
        let alice = service.register(register_req("alice")).await.unwrap();
        let principal = Principal::from(&alice);

        assert!(matches!(
            service.deactivate_user(&principal, alice.id).await,
            Err(ServiceError::Authz(AuthzError::Forbidden(Denial::AdminRequired { .. })))
        ));

        let admin = admin(&service).await;
        assert!(matches!(
            service.activate_user(&admin, Uuid::new_v4()).await,
            Err(ServiceError::Authz(AuthzError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let service = service();
        let admin = admin(&service).await;
        let alice = service.register(register_req("alice")).await.unwrap();

        let too_short = ChangePasswordRequest {
            new_password: "short".to_string(),
        };
        assert!(matches!(
            service.change_password(&admin, alice.id, too_short).await,
            Err(ServiceError::Validation(_))
        ));

        service
            .change_password(
                &admin,
                alice.id,
                ChangePasswordRequest {
                    new_password: "brand-new-secret".to_string(),
                },
            )
            .await
            .unwrap();

        let login = service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "brand-new-secret".to_string(),
            })
            .await;
        assert!(login.is_ok());
    }

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let service = service();
        assert!(service
            .seed_admin("admin", "admin@taskflow.local", "adminpass")
            .await
            .unwrap()
            .is_some());
        assert!(service
            .seed_admin("admin", "admin@taskflow.local", "adminpass")
            .await
            .unwrap()
            .is_none());
    }
}
