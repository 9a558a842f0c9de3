//! User identity sanitization for storage keys
//!
//! External user identifiers are arbitrary strings supplied by the identity
//! layer. Before they are used as file names or directory components they are
//! reduced to a safe, collision-resistant key: unsafe characters are replaced
//! and a short digest of the original id is appended so two distinct raw ids
//! can never collapse to the same key.

use sha2::{Digest, Sha256};

/// Maximum length of the sanitized prefix (before the digest suffix)
const MAX_PREFIX_LEN: usize = 64;

/// Number of hex digest characters appended to the sanitized prefix
const DIGEST_LEN: usize = 8;

/// Convert an arbitrary user identifier into a filesystem-safe storage key.
///
/// Every character outside `[A-Za-z0-9_\-@.]` is replaced with `_`, the prefix
/// is bounded to 64 characters, and the first 8 hex characters of the SHA-256
/// digest of the *original* id are appended. The function is pure and
/// deterministic; an empty input sanitizes to a digest-only key.
///
/// # Examples
///
/// ```rust
/// let key = memento::identity::sanitize_user_id("alice@laptop");
/// assert!(key.starts_with("alice@laptop_"));
/// ```
pub fn sanitize_user_id(user_id: &str) -> String {
    let mut prefix: String = user_id
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '_' | '-' | '@' | '.' => c,
            _ => '_',
        })
        .take(MAX_PREFIX_LEN)
        .collect();

    let digest = Sha256::digest(user_id.as_bytes());
    let mut suffix = String::with_capacity(DIGEST_LEN);
    for byte in digest.iter().take(DIGEST_LEN / 2) {
        suffix.push_str(&format!("{:02x}", byte));
    }

    if prefix.is_empty() {
        return suffix;
    }

    prefix.push('_');
    prefix.push_str(&suffix);
    prefix
}
