//! Prefix-routed CORS reverse proxy library.
//!
//! Requests to `/<prefix>/<path...>` are forwarded to the upstream origin
//! configured for `<prefix>`, with client-identifying headers stripped and
//! CORS headers attached to the response.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::ProxyConfig;
pub use http::HttpServer;
