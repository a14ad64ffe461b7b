//! Request and response types captured by the cache worker.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

/// An intercepted request, reduced to the parts that identify a cache entry.
///
/// Identity is method + full URL (query included, fragment dropped).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheRequest {
    pub method: String,
    pub url: Url,
}

impl CacheRequest {
    /// Build a request from a method and an absolute URL string.
    pub fn new(method: &str, url: &str) -> Result<Self, Error> {
        let mut url = Url::parse(url.trim()).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        url.set_fragment(None);
        Ok(Self { method: method.trim().to_ascii_uppercase(), url })
    }

    /// Shorthand for a GET request.
    pub fn get(url: &str) -> Result<Self, Error> {
        Self::new("GET", url)
    }

    /// Build a GET request from an already parsed URL.
    pub fn from_url(mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method: "GET".to_string(), url }
    }

    /// Whether the worker may intercept this request at all.
    ///
    /// Only GET requests over http(s) are ever looked up or stored.
    pub fn is_interceptable(&self) -> bool {
        self.method == "GET" && matches!(self.url.scheme(), "http" | "https")
    }

    /// Path component of the URL.
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

impl std::fmt::Display for CacheRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A captured response: status, headers and a body snapshot.
///
/// The body is reference counted, so handing one copy to the cache and
/// another to the caller never consumes either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, headers: Vec::new(), body: body.into() }
    }

    /// Append a header, keeping any existing values.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Status in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only plain 200 responses are ever written to a partition. Redirects,
    /// errors and opaque (status 0) responses are not.
    pub fn is_storable(&self) -> bool {
        self.status == 200
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
