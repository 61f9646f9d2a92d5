/// Credential and session management
///
/// A session is a pair of credentials:
///
/// - an **access token**: HS256 JWT, 15 minutes, sent as `Authorization: Bearer`
/// - a **refresh token**: 96 hex chars, kept by the client in the `rt` cookie,
///   stored server-side only as its SHA-256 digest for 8 days
///
/// Refresh tokens rotate: every successful [`SessionManager::refresh`]
/// consumes the presented record and stores a new one, so a token can be
/// exchanged at most once.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskflow_shared::service::{AuthSettings, SessionManager};
/// use taskflow_shared::store::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sessions = SessionManager::new(
///     Arc::new(MemoryStore::new()),
///     AuthSettings::new("a-secret-that-is-at-least-32-bytes-long"),
/// );
///
/// let session = sessions.signup("Ada", "ada@example.com", "password1", None).await?;
/// let rotated = sessions.refresh(Some(&session.refresh_token), None).await?;
/// assert!(sessions.refresh(Some(&session.refresh_token), None).await.is_err());
/// # let _ = rotated;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

use super::{ServiceError, ServiceResult};
use crate::auth::jwt::{create_token, default_access_ttl, Claims};
use crate::auth::middleware::verify_access_token;
use crate::auth::password::{
    hash_password, hash_password_with, validate_password_strength, verify_password, HashParams,
};
use crate::auth::refresh_token::{
    default_storage_ttl, generate_refresh_token, hash_refresh_token, looks_like_refresh_token,
};
use crate::models::refresh_token::CreateRefreshToken;
use crate::models::user::{normalize_email, CreateUser, PublicUser, User};
use crate::store::{Store, StoreError};

/// Token secrets and lifetimes
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// HS256 signing secret
    pub jwt_secret: String,

    /// Access token lifetime
    pub access_ttl: Duration,

    /// How long a stored refresh record stays usable
    pub refresh_ttl: Duration,

    /// Argon2id cost for new password hashes
    pub hash_params: HashParams,
}

impl AuthSettings {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_ttl: default_access_ttl(),
            refresh_ttl: default_storage_ttl(),
            hash_params: HashParams::default(),
        }
    }
}

/// Result of signup or login
///
/// Serializes as `{accessToken, user}`; the raw refresh token is skipped and
/// travels in the cookie instead.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub user: PublicUser,
    #[serde(skip)]
    pub refresh_token: String,
}

/// Result of a refresh: a new access token and the rotated refresh token
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Refreshed {
    pub access_token: String,
    #[serde(skip)]
    pub refresh_token: String,
}

/// Password verified against the stand-in hash when an email is unknown
const DECOY_PASSWORD: &str = "taskflow-decoy-password";

/// Issues, rotates and revokes credentials
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn Store>,
    settings: AuthSettings,
    /// Hash with the same cost as real accounts, so an unknown email costs
    /// one Argon2id verification just like a wrong password
    decoy_hash: Arc<str>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn Store>, settings: AuthSettings) -> Self {
        let decoy_hash = hash_password_with(DECOY_PASSWORD, settings.hash_params)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default cost for the decoy hash");
                hash_password(DECOY_PASSWORD).unwrap_or_default()
            });

        Self {
            store,
            settings,
            decoy_hash: Arc::from(decoy_hash),
        }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Registers an account and opens a session for it
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        user_agent: Option<String>,
    ) -> ServiceResult<Session> {
        let name = name.trim();
        let email = normalize_email(email);

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation("All fields required".to_string()));
        }
        if !email.validate_email() {
            return Err(ServiceError::Validation("Invalid email format".to_string()));
        }
        validate_password_strength(password).map_err(ServiceError::Validation)?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let params = self.settings.hash_params;
        let owned = password.to_string();
        let password_hash = blocking(move || hash_password_with(&owned, params)).await??;

        let user = self
            .store
            .create_user(CreateUser {
                name: name.to_string(),
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => {
                    ServiceError::Conflict("Email already registered".to_string())
                }
                other => other.into(),
            })?;

        info!(user_id = %user.id, "User signed up");
        self.open_session(&user, user_agent).await
    }

    /// Verifies credentials and opens a session
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        user_agent: Option<String>,
    ) -> ServiceResult<Session> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "Email and password required".to_string(),
            ));
        }

        let user = self.store.find_user_by_email(&email).await?;
        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.decoy_hash.to_string(),
        };

        let owned = password.to_string();
        let verified = blocking(move || verify_password(&owned, &stored_hash)).await?;

        let user = match (user, verified) {
            (Some(user), Ok(true)) => user,
            (Some(_), Err(e)) => return Err(e.into()),
            _ => {
                warn!("Login rejected");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        info!(user_id = %user.id, "User logged in");
        self.open_session(&user, user_agent).await
    }

    /// Exchanges a refresh token for a new access token, rotating the refresh token
    pub async fn refresh(
        &self,
        raw_token: Option<&str>,
        user_agent: Option<String>,
    ) -> ServiceResult<Refreshed> {
        let raw_token = raw_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::Unauthorized("No refresh token".to_string()))?;

        if !looks_like_refresh_token(raw_token) {
            return Err(ServiceError::Unauthorized("Invalid refresh token".to_string()));
        }

        let record = self
            .store
            .consume_refresh_token(&hash_refresh_token(raw_token))
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid refresh token".to_string()))?;

        let user = self
            .store
            .find_user_by_id(record.user_id)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid refresh token".to_string()))?;

        let access_token = self.access_token_for(user.id)?;
        let refresh_token = self.store_refresh_token(user.id, user_agent).await?;

        info!(user_id = %user.id, "Refresh token rotated");
        Ok(Refreshed {
            access_token,
            refresh_token,
        })
    }

    /// Revokes the refresh token, if any; absent or unknown tokens are ignored
    pub async fn logout(&self, raw_token: Option<&str>) -> ServiceResult<()> {
        if let Some(raw_token) = raw_token.filter(|t| !t.is_empty()) {
            let removed = self
                .store
                .delete_refresh_token(&hash_refresh_token(raw_token))
                .await?;
            info!(revoked = removed, "User logged out");
        }
        Ok(())
    }

    /// Public profile of the caller
    pub async fn me(&self, user_id: Uuid) -> ServiceResult<PublicUser> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        Ok(PublicUser::from(&user))
    }

    /// Validates an access token and returns its user ID
    pub fn verify_access(&self, token: &str) -> ServiceResult<Uuid> {
        verify_access_token(token, &self.settings.jwt_secret)
            .map(|auth| auth.user_id)
            .map_err(|e| ServiceError::Unauthorized(e.to_string()))
    }

    async fn open_session(&self, user: &User, user_agent: Option<String>) -> ServiceResult<Session> {
        let access_token = self.access_token_for(user.id)?;
        let refresh_token = self.store_refresh_token(user.id, user_agent).await?;

        Ok(Session {
            access_token,
            user: PublicUser::from(user),
            refresh_token,
        })
    }

    #[cfg(test)]
    fn decoy_hash(&self) -> &str {
        &self.decoy_hash
    }

    fn access_token_for(&self, user_id: Uuid) -> ServiceResult<String> {
        let claims = Claims::access(user_id, self.settings.access_ttl);
        create_token(&claims, &self.settings.jwt_secret)
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        user_agent: Option<String>,
    ) -> ServiceResult<String> {
        let (raw, hash) = generate_refresh_token();

        self.store
            .create_refresh_token(CreateRefreshToken {
                user_id,
                token_hash: hash,
                user_agent,
                expires_at: Utc::now() + self.settings.refresh_ttl,
            })
            .await?;

        Ok(raw)
    }
}

/// Runs CPU-heavy Argon2 work off the async worker threads
async fn blocking<T, F>(work: F) -> ServiceResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServiceError::Internal(format!("Password task failed: {}", e)))
}
