/// Business operations
///
/// Each service holds an `Arc<dyn Store>` and enforces the access rules on
/// top of it. Failures are reported as [`ServiceError`], whose variants map
/// one-to-one onto HTTP statuses in the API crate.
///
/// - [`session`]: signup, login, refresh (with rotation), logout, me
/// - [`projects`]: project CRUD and membership
/// - [`tasks`]: task CRUD scoped by project membership

pub mod projects;
pub mod session;
pub mod tasks;

pub use projects::ProjectService;
pub use session::{AuthSettings, Refreshed, Session, SessionManager};
pub use tasks::TaskService;

use crate::auth::authorization::AuthzError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;

/// Outcome taxonomy shared by all services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Login failed; the message never says whether the email exists
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, invalid or expired credential
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not permitted
    #[error("{0}")]
    Forbidden(String),

    /// Absent, or hidden from this caller
    #[error("{0}")]
    NotFound(String),

    /// Duplicate value (registered email)
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure; the message is for logs only
    #[error("{0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NoAccess | AuthzError::NoPermission => {
                ServiceError::NotFound(err.to_string())
            }
            AuthzError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authz_maps_to_not_found() {
        let err: ServiceError = AuthzError::NoAccess.into();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Project not found or no access"));

        let err: ServiceError = AuthzError::NoPermission.into();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Project not found or no permission"));
    }

    #[test]
    fn test_duplicate_store_error_is_internal_by_default() {
        let err: ServiceError = StoreError::Duplicate("x".to_string()).into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}
