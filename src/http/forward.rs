//! Upstream forwarding.
//!
//! # Responsibilities
//! - Issue the outbound request with the original method and body
//! - Stream request and response bodies without buffering
//! - Hand the upstream response back unmodified
//!
//! # Design Decisions
//! - One attempt per request: no retry, no fallback origin
//! - Transport failures surface as `ForwardError`; upstream status codes are not interpreted
//! - Client default redirect policy applies

use axum::{
    body::{Body, HttpBody},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use url::Url;

/// A request ready to leave the proxy.
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    /// Already sanitized.
    pub headers: HeaderMap,
    pub body: Body,
}

/// Transport-level failure talking to the upstream.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid upstream response: {0}")]
    Response(#[from] axum::http::Error),
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
    }
}

/// Sends outbound requests to upstream origins.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    /// Create a forwarder with a default client.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client))
    }

    /// Create a forwarder around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Send `request` upstream and return the raw response.
    pub async fn forward(&self, request: OutboundRequest) -> Result<Response, ForwardError> {
        let OutboundRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url).headers(headers);
        if body.size_hint().exact() != Some(0) {
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let upstream = builder.send().await?;

        let mut response = Response::builder().status(upstream.status());
        if let Some(headers) = response.headers_mut() {
            *headers = upstream.headers().clone();
        }

        Ok(response.body(Body::from_stream(upstream.bytes_stream()))?)
    }
}
