/// Refresh token generation and hashing
///
/// A refresh token is 48 random bytes, hex encoded (96 characters). The raw
/// value only ever travels in the `rt` cookie; storage keeps the SHA-256 hex
/// digest, so a leaked table cannot be replayed.
///
/// # Example
///
/// ```
/// use taskflow_shared::auth::refresh_token::{generate_refresh_token, hash_refresh_token};
///
/// let (token, hash) = generate_refresh_token();
/// assert_eq!(token.len(), 96);
/// assert_eq!(hash, hash_refresh_token(&token));
/// ```

use chrono::Duration;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Random bytes per token
pub const TOKEN_BYTES: usize = 48;

/// How long a stored record stays usable
pub fn default_storage_ttl() -> Duration {
    Duration::days(8)
}

/// Max-Age of the cookie carrying the token
pub fn default_cookie_ttl() -> Duration {
    Duration::days(7)
}

/// Generates a token, returning `(raw, sha256_hex)`
pub fn generate_refresh_token() -> (String, String) {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);

    let token = hex::encode(bytes);
    let hash = hash_refresh_token(&token);
    (token, hash)
}

/// SHA-256 hex digest of a raw token
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cheap shape check before touching storage
pub fn looks_like_refresh_token(token: &str) -> bool {
    token.len() == TOKEN_BYTES * 2 && token.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_refresh_token() {
        let (token, hash) = generate_refresh_token();
        assert_eq!(token.len(), 96);
        assert_eq!(hash.len(), 64);
        assert!(looks_like_refresh_token(&token));
        assert_ne!(token, hash);
    }

    #[test]
    fn test_tokens_are_unique() {
        let (a, _) = generate_refresh_token();
        let (b, _) = generate_refresh_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash_refresh_token("abc"), hash_refresh_token("abc"));
        assert_eq!(
            hash_refresh_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_looks_like_refresh_token() {
        assert!(!looks_like_refresh_token(""));
        assert!(!looks_like_refresh_token("zz"));
        assert!(!looks_like_refresh_token(&"g".repeat(96)));
        assert!(looks_like_refresh_token(&"a".repeat(96)));
    }

    #[test]
    fn test_ttls() {
        assert_eq!(default_storage_ttl(), Duration::days(8));
        assert_eq!(default_cookie_ttl().num_seconds(), 604800);
    }
}
