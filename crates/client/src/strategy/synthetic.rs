//! Minimal responses produced when neither network nor cache can answer.

use wayfarer_core::CachedResponse;

/// 404 for an image or static asset that is neither cached nor reachable.
pub fn not_found(message: &str) -> CachedResponse {
    CachedResponse::new(404, message.to_string()).with_header("content-type", "text/plain; charset=utf-8")
}

/// 503 JSON body for an API call with no network and no cached copy.
pub fn api_unavailable() -> CachedResponse {
    let body = serde_json::json!({ "error": "Network error, no cached data available" });
    CachedResponse::new(503, body.to_string()).with_header("content-type", "application/json")
}

/// 503 plain text for a page navigation with nothing to fall back to.
pub fn offline() -> CachedResponse {
    CachedResponse::new(503, "Offline").with_header("content-type", "text/plain; charset=utf-8")
}
