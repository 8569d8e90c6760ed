//! Outbound header sanitization.
//!
//! # Responsibilities
//! - Strip headers that identify the client, its geography or the proxy hop chain
//! - Strip `host`, `origin` and `referer` so the upstream sees no browser context
//! - Pass every other header through unchanged
//!
//! # Design Decisions
//! - The built-in set can be extended by config, never reduced
//! - Produces a new header map; the inbound request is left untouched

use axum::http::{HeaderMap, HeaderName};

/// Headers that are never forwarded upstream.
pub const IDENTIFYING_HEADERS: [&str; 9] = [
    "host",
    "origin",
    "referer",
    "cf-connecting-ip",
    "cf-ipcountry",
    "cf-ray",
    "x-forwarded-for",
    "x-forwarded-proto",
    "x-real-ip",
];

/// Removes identifying headers before a request leaves the proxy.
#[derive(Debug, Clone)]
pub struct HeaderSanitizer {
    stripped: Vec<HeaderName>,
}

impl HeaderSanitizer {
    /// Build a sanitizer from the built-in set plus `extra` names.
    ///
    /// Names that are not valid header names are skipped with a warning;
    /// config validation rejects them earlier.
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Self {
        let mut stripped: Vec<HeaderName> = IDENTIFYING_HEADERS
            .into_iter()
            .map(HeaderName::from_static)
            .collect();

        for name in extra {
            let name = name.as_ref();
            match HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes()) {
                Ok(header) if !stripped.contains(&header) => stripped.push(header),
                Ok(_) => {}
                Err(_) => tracing::warn!(header = %name, "Ignoring invalid header name"),
            }
        }

        Self { stripped }
    }

    /// Header names this sanitizer removes.
    pub fn stripped(&self) -> &[HeaderName] {
        &self.stripped
    }

    /// Return a copy of `headers` without the stripped names.
    pub fn sanitize(&self, headers: &HeaderMap) -> HeaderMap {
        let mut sanitized = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            if !self.stripped.contains(name) {
                sanitized.append(name.clone(), value.clone());
            }
        }
        sanitized
    }
}

impl Default for HeaderSanitizer {
    fn default() -> Self {
        Self::new::<&str>(&[])
    }
}
