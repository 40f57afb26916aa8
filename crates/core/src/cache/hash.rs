//! Cache key derivation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a URL.
///
/// The key is the hex-encoded SHA-256 of the URL bytes exactly as given.
/// Callers trim before hashing; no other normalization is applied, so
/// `https://example.com` and `https://example.com/` are distinct keys.
pub fn compute_cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}
