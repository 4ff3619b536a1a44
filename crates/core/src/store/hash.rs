//! Cache key generation for normalized request descriptors.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request.
///
/// The key covers the method and the normalized absolute URL; header
/// variation is deliberately ignored.
pub fn entry_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
