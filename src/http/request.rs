//! Request correlation.
//!
//! # Responsibilities
//! - Assign a unique request ID (UUID v4) to every inbound request
//! - Echo the ID back on the response
//! - Expose the ID to handlers for structured logging
//!
//! # Design Decisions
//! - The ID lives in request extensions, never in the forwarded headers
//! - A client-supplied `x-request-id` is reused and forwarded untouched
//! - An upstream `x-request-id` on the response is left as is

use axum::{
    body::Body,
    extract::Request,
    http::{Extensions, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation ID attached to a request's extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub HeaderValue);

impl RequestId {
    fn generate() -> Self {
        let id = Uuid::new_v4().to_string();
        Self(HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("unknown")))
    }

    pub fn as_str(&self) -> &str {
        self.0.to_str().unwrap_or("unknown")
    }
}

/// Middleware that tags the request with a [`RequestId`] and echoes it on the response.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let id = match request.headers().get(&X_REQUEST_ID) {
        Some(value) if !value.is_empty() => RequestId(value.clone()),
        _ => RequestId::generate(),
    };
    request.extensions_mut().insert(id.clone());

    let mut response = next.run(request).await;
    response.headers_mut().entry(X_REQUEST_ID).or_insert(id.0);
    response
}

/// The request ID recorded in `extensions`, or `"unknown"`.
pub fn request_id(extensions: &Extensions) -> &str {
    extensions
        .get::<RequestId>()
        .map(RequestId::as_str)
        .unwrap_or("unknown")
}
