/// Bearer authentication primitives
///
/// The HTTP layer reads the `Authorization` header and hands its value to
/// [`authenticate_bearer`]. On success the resulting [`AuthContext`] is put
/// into the request extensions, where handlers pick it up with
/// `Extension<AuthContext>`.
///
/// Any failure (missing header, wrong scheme, bad signature, wrong issuer,
/// expiry) is an [`AuthError`]; the server answers all of them with 401.
///
/// # Example
///
/// ```
/// use taskflow_shared::auth::jwt::{create_token, default_access_ttl, Claims};
/// use taskflow_shared::auth::middleware::authenticate_bearer;
/// use uuid::Uuid;
///
/// let secret = "a-secret-that-is-at-least-32-bytes-long";
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::access(user_id, default_access_ttl()), secret).unwrap();
///
/// let header = format!("Bearer {}", token);
/// let auth = authenticate_bearer(Some(&header), secret).unwrap();
/// assert_eq!(auth.user_id, user_id);
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};

/// Identity of the caller of an authenticated request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID (the token's `sub`)
    pub user_id: Uuid,
}

/// Bearer authentication failure
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    InvalidToken(String),
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}

/// Validates an access token and returns the caller's context
pub fn verify_access_token(token: &str, secret: &str) -> Result<AuthContext, AuthError> {
    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken("Invalid token".to_string()),
    })?;

    Ok(AuthContext {
        user_id: claims.sub,
    })
}

/// [`extract_bearer`] followed by [`verify_access_token`]
pub fn authenticate_bearer(header: Option<&str>, secret: &str) -> Result<AuthContext, AuthError> {
    verify_access_token(extract_bearer(header)?, secret)
}
