//! Request identity and response snapshot types.
//!
//! A request is identified by its method and URL; a response is captured
//! as an owned snapshot so one copy can be returned to the page while
//! another is persisted. The snapshot is the cache entry value.

use serde::{Deserialize, Serialize};

use crate::cache::key::compute_entry_key;

/// HTTP request method.
///
/// Only GET requests are ever intercepted, but the identity of an entry
/// includes the method so a cached GET never answers anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Method {
    /// Canonical wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a request loads a top-level page document or a subresource.
///
/// Navigation requests get the cached root document as their offline
/// fallback; everything else falls back to the cached icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequestMode {
    /// Top-level page navigation.
    Navigation,
    /// Subresource load (script, style, image, data).
    #[default]
    Resource,
}

/// An outgoing request as seen by the interception layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub mode: RequestMode,
}

impl Request {
    /// A plain GET subresource request.
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), mode: RequestMode::Resource }
    }

    /// A GET request in navigation mode.
    pub fn navigation(url: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), mode: RequestMode::Navigation }
    }

    /// Normalized identity of this request in the cache store.
    pub fn entry_key(&self) -> String {
        compute_entry_key(self.method.as_str(), &self.url)
    }
}

/// A captured response: status, headers, and a fully buffered body.
///
/// A live response body can be consumed only once; capturing it into an
/// owned snapshot is what lets the worker hand one copy to the page and
/// persist another independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header, if present.
    pub content_type: Option<String>,
    /// Response headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Fully buffered response body.
    pub body: Vec<u8>,
    /// ISO8601 timestamp of when the response was fetched.
    pub fetched_at: String,
}

impl ResponseSnapshot {
    /// Check if the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_as_str() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_request_constructors() {
        let req = Request::get("https://example.com/app.js");
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.mode, RequestMode::Resource);

        let nav = Request::navigation("https://example.com/");
        assert_eq!(nav.mode, RequestMode::Navigation);
    }

    #[test]
    fn test_entry_key_ignores_mode() {
        let plain = Request::get("https://example.com/");
        let nav = Request::navigation("https://example.com/");
        assert_eq!(plain.entry_key(), nav.entry_key());
    }

    #[test]
    fn test_snapshot_ok_range() {
        let mut snapshot = ResponseSnapshot {
            status: 200,
            content_type: None,
            headers: Vec::new(),
            body: Vec::new(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        };
        assert!(snapshot.ok());
        snapshot.status = 299;
        assert!(snapshot.ok());
        snapshot.status = 304;
        assert!(!snapshot.ok());
        snapshot.status = 404;
        assert!(!snapshot.ok());
    }
}
