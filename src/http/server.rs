//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener
//! - Run each request through route → sanitize → forward → decorate

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::forward::{ForwardError, Forwarder, OutboundRequest};
use crate::http::request::{request_id, request_id_middleware};
use crate::observability::metrics::{self, NO_PREFIX};
use crate::routing::Router as ProxyRouter;
use crate::security::cors::{self, CorsPolicy};
use crate::security::headers::HeaderSanitizer;

/// Application state injected into handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub sanitizer: Arc<HeaderSanitizer>,
    pub cors: Arc<CorsPolicy>,
    pub forwarder: Forwarder,
}

impl AppState {
    /// Compile the runtime state from a validated configuration.
    pub fn from_config(config: &ProxyConfig, forwarder: Forwarder) -> Self {
        Self {
            router: Arc::new(ProxyRouter::new(config.upstreams.clone())),
            sanitizer: Arc::new(HeaderSanitizer::new(&config.headers.strip_extra)),
            cors: Arc::new(CorsPolicy::new(&config.cors)),
            forwarder,
        }
    }
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let forwarder = Forwarder::new()?;
        Ok(Self::with_forwarder(config, forwarder))
    }

    /// Create a server that forwards through `forwarder`.
    pub fn with_forwarder(config: ProxyConfig, forwarder: Forwarder) -> Self {
        let state = AppState::from_config(&config, forwarder);
        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(request_id_middleware))
    }

    /// The router this server serves.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve requests on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstreams = ?self.config.upstreams.keys().collect::<Vec<_>>(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
///
/// OPTIONS is answered locally. Everything else is routed, sanitized,
/// forwarded and CORS-decorated. Transport failures escape decoration.
async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ForwardError> {
    let start_time = Instant::now();
    let request_id = request_id(request.extensions()).to_string();
    let method = request.method().clone();
    let origin = cors::request_origin(request.headers()).cloned();

    if method == Method::OPTIONS {
        let response = state.cors.preflight(request.headers());
        metrics::record_request(method.as_str(), response.status().as_u16(), NO_PREFIX, start_time);
        return Ok(response);
    }

    let target = match state.router.route(&method, request.uri()) {
        Ok(target) => target,
        Err(rejection) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %request.uri().path(),
                reason = %rejection,
                "Request rejected"
            );
            let response = state.cors.decorate(origin.as_ref(), rejection.into_response());
            metrics::record_request(method.as_str(), response.status().as_u16(), NO_PREFIX, start_time);
            return Ok(response);
        }
    };

    if state.cors.reject_before_forward() {
        if let Some(origin) = &origin {
            if state.cors.pick_allowed_origin(origin).is_none() {
                tracing::warn!(request_id = %request_id, origin = ?origin, "Rejected before forwarding");
                let response = cors::forbidden();
                metrics::record_request(method.as_str(), response.status().as_u16(), &target.prefix, start_time);
                return Ok(response);
            }
        }
    }

    let (parts, body) = request.into_parts();
    let outbound = OutboundRequest {
        method: parts.method,
        url: target.url,
        headers: state.sanitizer.sanitize(&parts.headers),
        body,
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        prefix = %target.prefix,
        upstream = %outbound.url,
        "Forwarding request"
    );

    let upstream = match state.forwarder.forward(outbound).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, prefix = %target.prefix, error = %e, "Upstream error");
            metrics::record_upstream_error(&target.prefix);
            metrics::record_request(method.as_str(), 502, &target.prefix, start_time);
            return Err(e);
        }
    };

    let response = state.cors.decorate(origin.as_ref(), upstream);
    metrics::record_request(method.as_str(), response.status().as_u16(), &target.prefix, start_time);
    Ok(response)
}
