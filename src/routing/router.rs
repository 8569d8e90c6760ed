//! Route lookup.
//!
//! # Responsibilities
//! - Gate the proxied methods (GET, HEAD, POST)
//! - Resolve the path prefix against the upstream map
//! - Build the fully-qualified upstream URL
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Exact, case-sensitive prefix lookup
//! - Explicit rejection rather than silent default

use axum::{
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use indexmap::IndexMap;
use url::Url;

use crate::routing::path::parse_prefix_path;

/// Methods forwarded upstream. OPTIONS is answered locally.
pub const PROXIED_METHODS: [Method; 3] = [Method::GET, Method::HEAD, Method::POST];

/// Why a request cannot be proxied. `Display` is the response body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteRejection {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Bad request. Use /<prefix>/<path...>. Known prefixes: {}", .known.join(", "))]
    MalformedPath { known: Vec<String> },

    #[error("Unknown prefix \"{prefix}\". Known prefixes: {}", .known.join(", "))]
    UnknownPrefix { prefix: String, known: Vec<String> },
}

impl RouteRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            RouteRejection::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RouteRejection::MalformedPath { .. } | RouteRejection::UnknownPrefix { .. } => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for RouteRejection {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// The upstream a request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Prefix the request was routed by.
    pub prefix: String,
    /// Upstream base origin joined with the remainder path and query.
    pub url: Url,
}

/// Immutable prefix router.
#[derive(Debug, Clone)]
pub struct Router {
    upstreams: IndexMap<String, Url>,
}

impl Router {
    /// Build a router from the configured prefix map.
    pub fn new(upstreams: IndexMap<String, Url>) -> Self {
        Self { upstreams }
    }

    /// Known prefixes in listing order.
    pub fn prefixes(&self) -> Vec<String> {
        self.upstreams.keys().cloned().collect()
    }

    /// Resolve a non-OPTIONS request to its upstream target.
    pub fn route(&self, method: &Method, uri: &Uri) -> Result<Target, RouteRejection> {
        if !PROXIED_METHODS.contains(method) {
            return Err(RouteRejection::MethodNotAllowed);
        }

        let parsed = parse_prefix_path(uri.path()).ok_or_else(|| RouteRejection::MalformedPath {
            known: self.prefixes(),
        })?;

        let base = self
            .upstreams
            .get(parsed.prefix)
            .ok_or_else(|| RouteRejection::UnknownPrefix {
                prefix: parsed.prefix.to_string(),
                known: self.prefixes(),
            })?;

        let mut url = base.clone();
        url.set_path(parsed.remainder);
        url.set_query(uri.query());

        Ok(Target {
            prefix: parsed.prefix.to_string(),
            url,
        })
    }
}
