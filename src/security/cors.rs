//! CORS allow-list enforcement.
//!
//! # Responsibilities
//! - Answer OPTIONS requests locally (preflight or plain capability check)
//! - Decorate proxied and rejected responses with `Access-Control-Allow-Origin`
//! - Replace responses for disallowed origins with 403
//!
//! # Design Decisions
//! - Empty allow-list mirrors any requesting origin
//! - Requests without `Origin` get `Access-Control-Allow-Origin: *`
//! - `Vary: Origin` is appended, never overwriting upstream `Vary` values
//! - Decoration consumes the response and returns a new one

use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS,
            ACCESS_CONTROL_REQUEST_METHOD, ALLOW, ORIGIN, VARY,
        },
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};

use crate::config::CorsConfig;

/// Methods advertised to preflight requests.
pub const ALLOW_METHODS: &str = "GET,HEAD,POST,OPTIONS";

/// `Allow` value for non-CORS OPTIONS requests.
pub const BARE_OPTIONS_ALLOW: &str = "GET, HEAD, POST, OPTIONS";

/// Preflight cache lifetime in seconds.
pub const PREFLIGHT_MAX_AGE: &str = "86400";

/// The `Origin` of a request, if present and non-empty.
pub fn request_origin(headers: &HeaderMap) -> Option<&HeaderValue> {
    headers.get(ORIGIN).filter(|value| !value.is_empty())
}

/// The plain 403 returned to disallowed origins on actual requests.
pub fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "Forbidden").into_response()
}

/// Origin allow-list and the CORS behaviour built on it.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<HeaderValue>,
    preflight_status: StatusCode,
    reject_before_forward: bool,
}

impl CorsPolicy {
    /// Build a policy from config. Origins that cannot be header values are
    /// skipped; no request could ever carry them.
    pub fn new(config: &CorsConfig) -> Self {
        let allowed_origins = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring unrepresentable allowed origin");
                    None
                }
            })
            .collect();

        Self {
            allowed_origins,
            preflight_status: StatusCode::from_u16(config.preflight_status)
                .unwrap_or(StatusCode::NO_CONTENT),
            reject_before_forward: config.reject_before_forward,
        }
    }

    /// Whether disallowed origins should be rejected before forwarding.
    pub fn reject_before_forward(&self) -> bool {
        self.reject_before_forward
    }

    /// Resolve the `Access-Control-Allow-Origin` value for `origin`.
    ///
    /// Returns `None` when the origin is not permitted.
    pub fn pick_allowed_origin(&self, origin: &HeaderValue) -> Option<HeaderValue> {
        if self.allowed_origins.is_empty() || self.allowed_origins.contains(origin) {
            Some(origin.clone())
        } else {
            None
        }
    }

    /// Answer an OPTIONS request. Never forwarded upstream.
    pub fn preflight(&self, headers: &HeaderMap) -> Response {
        let origin = request_origin(headers);
        let requested_method = headers
            .get(ACCESS_CONTROL_REQUEST_METHOD)
            .filter(|value| !value.is_empty());

        let Some((origin, _)) = origin.zip(requested_method) else {
            return (
                [(ALLOW, HeaderValue::from_static(BARE_OPTIONS_ALLOW))],
                Body::empty(),
            )
                .into_response();
        };

        let Some(allow_origin) = self.pick_allowed_origin(origin) else {
            tracing::warn!(origin = ?origin, "Preflight from disallowed origin");
            return StatusCode::FORBIDDEN.into_response();
        };

        let allow_headers = headers
            .get(ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));

        let mut response = Response::new(Body::empty());
        *response.status_mut() = self.preflight_status;
        let out = response.headers_mut();
        out.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        out.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        out.insert(ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
        out.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(PREFLIGHT_MAX_AGE));
        out.insert(VARY, HeaderValue::from_static("Origin"));
        response
    }

    /// Attach CORS headers to an actual response.
    ///
    /// `origin` is the request's `Origin` (see [`request_origin`]). A
    /// disallowed origin replaces the response with 403 "Forbidden" and the
    /// original body is dropped.
    pub fn decorate(&self, origin: Option<&HeaderValue>, response: Response) -> Response {
        let (mut parts, body) = response.into_parts();

        match origin {
            Some(origin) => {
                let Some(allow_origin) = self.pick_allowed_origin(origin) else {
                    tracing::warn!(origin = ?origin, "Request from disallowed origin");
                    return forbidden();
                };
                parts.headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
                parts.headers.append(VARY, HeaderValue::from_static("Origin"));
            }
            None => {
                parts
                    .headers
                    .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
            }
        }

        Response::from_parts(parts, body)
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::new(&CorsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(origins: &[&str]) -> CorsPolicy {
        CorsPolicy::new(&CorsConfig {
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            ..CorsConfig::default()
        })
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    fn upstream(status: StatusCode, body: &'static str) -> Response {
        (status, [(VARY, "Accept-Encoding")], body).into_response()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_empty_allow_list_mirrors_any_origin() {
        let origin = HeaderValue::from_static("https://anything.test");
        assert_eq!(policy(&[]).pick_allowed_origin(&origin), Some(origin));
    }

    #[test]
    fn test_allow_list_membership() {
        let policy = policy(&["https://a.test", "http://localhost:8000"]);
        let member = HeaderValue::from_static("http://localhost:8000");
        let stranger = HeaderValue::from_static("https://b.test");
        assert_eq!(policy.pick_allowed_origin(&member), Some(member));
        assert_eq!(policy.pick_allowed_origin(&stranger), None);
    }

    #[test]
    fn test_empty_origin_counts_as_absent() {
        assert!(request_origin(&headers(&[("origin", "")])).is_none());
        assert!(request_origin(&headers(&[("origin", "https://a.test")])).is_some());
    }

    #[test]
    fn test_preflight_allowed() {
        let response = policy(&["https://a.test"]).preflight(&headers(&[
            ("origin", "https://a.test"),
            ("access-control-request-method", "GET"),
            ("access-control-request-headers", "content-type,x-mal-client-id"),
        ]));

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let h = response.headers();
        assert_eq!(h[ACCESS_CONTROL_ALLOW_ORIGIN], "https://a.test");
        assert_eq!(h[ACCESS_CONTROL_ALLOW_METHODS], "GET,HEAD,POST,OPTIONS");
        assert_eq!(h[ACCESS_CONTROL_ALLOW_HEADERS], "content-type,x-mal-client-id");
        assert_eq!(h[ACCESS_CONTROL_MAX_AGE], "86400");
        assert_eq!(h[VARY], "Origin");
    }

    #[test]
    fn test_preflight_without_requested_headers_echoes_empty() {
        let response = policy(&[]).preflight(&headers(&[
            ("origin", "https://a.test"),
            ("access-control-request-method", "POST"),
        ]));
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_HEADERS], "");
    }

    #[test]
    fn test_preflight_uses_configured_status() {
        let policy = CorsPolicy::new(&CorsConfig {
            preflight_status: 200,
            ..CorsConfig::default()
        });
        let response = policy.preflight(&headers(&[
            ("origin", "https://a.test"),
            ("access-control-request-method", "GET"),
        ]));
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_preflight_disallowed_is_empty_403() {
        let response = policy(&["https://a.test"]).preflight(&headers(&[
            ("origin", "https://evil.test"),
            ("access-control-request-method", "GET"),
        ]));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN));
        assert_eq!(body_text(response).await, "");
    }

    #[test]
    fn test_bare_options_without_cors_headers() {
        for headers in [
            headers(&[]),
            headers(&[("origin", "https://a.test")]),
            headers(&[("access-control-request-method", "GET")]),
        ] {
            let response = policy(&["https://a.test"]).preflight(&headers);
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[ALLOW], "GET, HEAD, POST, OPTIONS");
            assert!(!response.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN));
        }
    }

    #[tokio::test]
    async fn test_decorate_without_origin_is_wildcard() {
        let response = policy(&["https://a.test"]).decorate(None, upstream(StatusCode::OK, "data"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let vary: Vec<_> = response.headers().get_all(VARY).iter().collect();
        assert_eq!(vary, vec!["Accept-Encoding"]);
        assert_eq!(body_text(response).await, "data");
    }

    #[tokio::test]
    async fn test_decorate_allowed_origin_appends_vary() {
        let origin = HeaderValue::from_static("https://a.test");
        let response = policy(&["https://a.test"])
            .decorate(Some(&origin), upstream(StatusCode::NOT_FOUND, "missing"));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://a.test");
        let vary: Vec<_> = response.headers().get_all(VARY).iter().collect();
        assert_eq!(vary, vec!["Accept-Encoding", "Origin"]);
        assert_eq!(body_text(response).await, "missing");
    }

    #[tokio::test]
    async fn test_decorate_overwrites_upstream_allow_origin() {
        let origin = HeaderValue::from_static("https://a.test");
        let upstream = (
            [(ACCESS_CONTROL_ALLOW_ORIGIN, "https://upstream.test")],
            "ok",
        )
            .into_response();
        let response = policy(&[]).decorate(Some(&origin), upstream);
        let values: Vec<_> = response
            .headers()
            .get_all(ACCESS_CONTROL_ALLOW_ORIGIN)
            .iter()
            .collect();
        assert_eq!(values, vec!["https://a.test"]);
    }

    #[tokio::test]
    async fn test_decorate_disallowed_origin_is_forbidden() {
        let origin = HeaderValue::from_static("https://evil.test");
        let response = policy(&["https://a.test"])
            .decorate(Some(&origin), upstream(StatusCode::OK, "secret"));

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN));
        assert!(!response.headers().contains_key(VARY));
        assert_eq!(body_text(response).await, "Forbidden");
    }
}
