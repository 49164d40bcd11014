/// Principal resolution
///
/// Turns an `Authorization` header value into the authenticated [`Principal`]
/// for the current request. Every call re-verifies the token and re-reads the
/// user, so role changes and deactivation take effect on the next request.
///
/// # Resolution Steps
///
/// ```text
/// header ──> "<scheme> <token>" ──> verify token ──> sub claim ──> user lookup ──> active?
///   │               │                    │               │              │             │
///   └ Missing       └ Malformed          └ InvalidOr     └ Malformed    └ Principal   └ Principal
///     Credentials     Credential           Expired         Credential     NotFound      Inactive
/// ```
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::auth::principal::PrincipalResolver;
/// use taskflow_shared::store::MemoryStore;
///
/// # async fn example(header: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let resolver = PrincipalResolver::new("secret-key-at-least-32-bytes-long!!");
///
/// let principal = resolver.resolve(&store, header).await?;
/// println!("{} acting as {}", principal.id, principal.role);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::jwt::{self, JwtError};
use super::roles::Role;
use crate::models::user::User;
use crate::store::{StoreError, UserStore};

/// The authenticated identity on whose behalf an operation runs
///
/// Built fresh for each request and passed explicitly to every
/// authorization and service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub is_active: bool,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            is_active: user.is_active,
        }
    }
}

/// Why a credential did not resolve to a principal
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Header is not `Bearer <token>`, or the token carries no usable subject
    #[error("{0}")]
    MalformedCredential(String),

    /// Bad signature, expired, wrong issuer or unparseable token
    #[error("Invalid or expired token")]
    InvalidOrExpiredCredential(#[source] JwtError),

    /// Token subject does not name an existing user
    #[error("User not found")]
    PrincipalNotFound,

    /// Token subject names a deactivated user
    #[error("User is not active")]
    PrincipalInactive,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Resolves bearer credentials against the user store
#[derive(Debug, Clone)]
pub struct PrincipalResolver {
    jwt_secret: String,
}

impl PrincipalResolver {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Resolves an `Authorization` header value to a principal
    ///
    /// # Errors
    ///
    /// See [`AuthError`]; each variant corresponds to one resolution step.
    pub async fn resolve<S>(&self, store: &S, header: Option<&str>) -> Result<Principal, AuthError>
    where
        S: UserStore + ?Sized,
    {
        let header = header.ok_or(AuthError::MissingCredentials)?;
        let token = parse_bearer(header)?;

        let claims = jwt::validate_token(token, &self.jwt_secret).map_err(|e| {
            debug!(error = %e, "Token verification failed");
            AuthError::InvalidOrExpiredCredential(e)
        })?;

        let user_id = claims
            .sub
            .as_deref()
            .and_then(|sub| Uuid::parse_str(sub).ok())
            .ok_or_else(|| AuthError::MalformedCredential("Invalid token: no user id".to_string()))?;

        let user = store
            .find_user(user_id)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if !user.is_active {
            warn!(user_id = %user.id, "Rejected token for inactive user");
            return Err(AuthError::PrincipalInactive);
        }

        debug!(user_id = %user.id, role = %user.role, "Principal resolved");
        Ok(Principal::from(&user))
    }
}

/// Splits `"<scheme> <token>"` on a single space, accepting `bearer` in any case
///
/// ```
/// use taskflow_shared::auth::principal::parse_bearer;
///
/// assert_eq!(parse_bearer("Bearer abc").unwrap(), "abc");
/// assert_eq!(parse_bearer("bearer abc").unwrap(), "abc");
/// assert!(parse_bearer("Basic abc").is_err());
/// assert!(parse_bearer("Bearer").is_err());
/// ```
pub fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split(' ');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(AuthError::MalformedCredential(
            "Invalid authorization header format".to_string(),
        )),
    }
}
