/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: HS256 access tokens
/// - [`refresh_token`]: opaque refresh tokens and their SHA-256 digests
/// - [`middleware`]: bearer header parsing and the per-request [`middleware::AuthContext`]
/// - [`authorization`]: the project membership guard
///
/// # Example
///
/// ```
/// use taskflow_shared::auth::password::{hash_password, verify_password};
/// use taskflow_shared::auth::refresh_token::generate_refresh_token;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let (raw, digest) = generate_refresh_token();
/// assert_ne!(raw, digest);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod refresh_token;
