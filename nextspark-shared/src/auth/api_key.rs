/// API key authentication utilities
///
/// This module provides utilities for generating and validating API keys.
/// These work in conjunction with the `models::api_key` module for database operations.
///
/// # Security
///
/// - **Format**: `nsk_{32_chars}` (prefix + 32 random alphanumeric chars)
/// - **Storage**: Keys are hashed with SHA-256 before storage
/// - **Scopes**: Fine-grained permissions (e.g., "tasks:read", "pages:write")
///
/// # Example
///
/// ```
/// use nextspark_shared::auth::api_key::{generate_api_key, hash_api_key, validate_api_key_format};
///
/// let (key, hash) = generate_api_key();
/// assert!(key.starts_with("nsk_"));
/// assert_eq!(key.len(), 36);
///
/// assert!(validate_api_key_format(&key));
/// assert_eq!(hash, hash_api_key(&key));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of the API key (characters)
const KEY_RANDOM_LENGTH: usize = 32;

/// API key prefix
const KEY_PREFIX: &str = "nsk_";

/// Total length of an API key (prefix + random)
pub const API_KEY_LENGTH: usize = KEY_PREFIX.len() + KEY_RANDOM_LENGTH;

/// Generates a new API key
///
/// Creates a cryptographically random API key with the format `nsk_{32_chars}`.
/// Also returns the SHA-256 hash for database storage.
///
/// # Returns
///
/// Tuple of (plaintext_key, sha256_hash)
pub fn generate_api_key() -> (String, String) {
    let random_part = generate_random_string(KEY_RANDOM_LENGTH);
    let key = format!("{}{}", KEY_PREFIX, random_part);
    let hash = hash_api_key(&key);

    (key, hash)
}

/// Hashes an API key with SHA-256
///
/// # Returns
///
/// Hex-encoded hash (64 characters)
pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validates the format of an API key
///
/// Checks the prefix, length, and character set without touching the database.
pub fn validate_api_key_format(key: &str) -> bool {
    if !key.starts_with(KEY_PREFIX) || key.len() != API_KEY_LENGTH {
        return false;
    }

    key[KEY_PREFIX.len()..]
        .chars()
        .all(|c| c.is_ascii_alphanumeric())
}

/// Checks whether a scope list grants a required scope
///
/// Supports:
/// - Global wildcard `*`
/// - Exact match (`tasks:read`)
/// - Resource wildcard (`tasks:*` matches `tasks:read`)
pub fn has_scope(scopes: &[String], required: &str) -> bool {
    for scope in scopes {
        if scope == "*" {
            return true;
        }

        if scope == required {
            return true;
        }

        if let Some(prefix) = scope.strip_suffix('*') {
            if prefix.ends_with(':') && required.starts_with(prefix) {
                return true;
            }
        }
    }

    false
}

/// Generates a random base62 string
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_api_key() {
        let (key1, hash1) = generate_api_key();
        let (key2, hash2) = generate_api_key();

        assert!(key1.starts_with("nsk_"));
        assert_eq!(key1.len(), API_KEY_LENGTH);

        assert_ne!(key1, key2);
        assert_ne!(hash1, hash2);

        assert_eq!(hash1.len(), 64); // SHA-256 hex
    }

    #[test]
    fn test_hash_api_key_deterministic() {
        let key = "nsk_test123";
        assert_eq!(hash_api_key(key), hash_api_key(key));
        assert_ne!(hash_api_key(key), hash_api_key("nsk_different"));
    }

    #[test]
    fn test_validate_api_key_format() {
        let (key, _) = generate_api_key();
        assert!(validate_api_key_format(&key));

        assert!(!validate_api_key_format("nsk_short"));
        assert!(!validate_api_key_format("wrong_prefix_aaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
        assert!(!validate_api_key_format(&format!(
            "nsk_{}",
            "a!".repeat(16) // invalid chars
        )));
    }

    #[test]
    fn test_has_scope_exact_and_wildcards() {
        let scopes = vec!["tasks:read".to_string(), "pages:*".to_string()];

        assert!(has_scope(&scopes, "tasks:read"));
        assert!(!has_scope(&scopes, "tasks:write"));
        assert!(has_scope(&scopes, "pages:read"));
        assert!(has_scope(&scopes, "pages:write"));
        assert!(!has_scope(&scopes, "customers:read"));

        let all = vec!["*".to_string()];
        assert!(has_scope(&all, "anything:at-all"));

        let none: Vec<String> = vec![];
        assert!(!has_scope(&none, "tasks:read"));
    }
}
