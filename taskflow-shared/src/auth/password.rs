/// Password hashing with Argon2id
///
/// Default cost: 64 MB memory, 3 passes, 4 lanes, 32-byte output. Hashes are
/// stored as PHC strings, so verification reads the cost back from the hash
/// and keeps working if the defaults change.
///
/// # Example
///
/// ```
/// use taskflow_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct horse battery")?;
/// assert!(verify_password("correct horse battery", &hash)?);
/// assert!(!verify_password("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory in KiB
    pub m_cost: u32,
    /// Passes
    pub t_cost: u32,
    /// Lanes
    pub p_cost: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            m_cost: 65536,
            t_cost: 3,
            p_cost: 4,
        }
    }
}

impl HashParams {
    /// Minimal cost for test suites that create many accounts
    pub fn fast() -> Self {
        Self {
            m_cost: 1024,
            t_cost: 1,
            p_cost: 1,
        }
    }
}

/// Hashes a password with the default cost
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with(password, HashParams::default())
}

/// Hashes a password with explicit cost parameters
pub fn hash_password_with(password: &str, cost: HashParams) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(cost.m_cost)
        .t_cost(cost.t_cost)
        .p_cost(cost.p_cost)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a PHC hash
///
/// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Checks the signup password policy
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_default_cost() {
        let hash = hash_password("my_password").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=65536,t=3,p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let a = hash_password_with("same", HashParams::fast()).unwrap();
        let b = hash_password_with("same", HashParams::fast()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password_with("correct_password", HashParams::fast()).unwrap();
        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_malformed_hash() {
        assert!(matches!(
            verify_password("password", "not-a-phc-string"),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_validate_password_strength() {
        assert!(validate_password_strength("12345678").is_ok());
        assert!(validate_password_strength("1234567").is_err());
        assert!(validate_password_strength("").is_err());
    }
}
