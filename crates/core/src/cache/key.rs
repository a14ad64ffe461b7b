//! Cache entry key generation.

use sha2::{Digest, Sha256};

use crate::CacheRequest;

/// Compute the key of a cache entry from the request identity.
///
/// The method and the full URL (query included) both take part, so a GET
/// and a HEAD for the same URL never collide.
pub fn compute_entry_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Key of the entry that would store `request`.
pub fn request_key(request: &CacheRequest) -> String {
    compute_entry_key(&request.method, request.url.as_str())
}
