//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use cors_proxy::config::ProxyConfig;
use cors_proxy::http::Forwarder;
use cors_proxy::HttpServer;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Everything the mock upstream has received.
pub type Recorder = Arc<Mutex<Vec<Recorded>>>;

/// Start a mock upstream on an ephemeral port.
///
/// It records every request and answers with the request body echoed back.
/// A path of `/status/<code>` answers with that status code. Every response
/// carries `Vary: Accept-Encoding` and `X-Upstream: mock`.
pub async fn start_mock_upstream() -> (SocketAddr, Recorder) {
    let recorder: Recorder = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/", any(record))
        .route("/{*path}", any(record))
        .with_state(recorder.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, recorder)
}

async fn record(State(recorder): State<Recorder>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap().to_vec();
    let path = parts.uri.path().to_string();

    let status = path
        .strip_prefix("/status/")
        .and_then(|code| code.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK);

    recorder.lock().unwrap().push(Recorded {
        method: parts.method,
        path,
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers,
        body: body.clone(),
    });

    (
        status,
        [("vary", "Accept-Encoding"), ("x-upstream", "mock")],
        body,
    )
        .into_response()
}

/// A running proxy, stopped when dropped.
pub struct ProxyHandle {
    pub addr: SocketAddr,
    _shutdown: oneshot::Sender<()>,
}

impl ProxyHandle {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Config whose `mal` prefix points at `upstream`.
pub fn config_for(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstreams.clear();
    config.upstreams.insert(
        "mal".to_string(),
        Url::parse(&format!("http://{upstream}")).unwrap(),
    );
    config
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> ProxyHandle {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let forwarder = Forwarder::with_client(client());
    let server = HttpServer::with_forwarder(config, forwarder);
    tokio::spawn(async move {
        let _ = server
            .run(listener, async {
                let _ = rx.await;
            })
            .await;
    });

    ProxyHandle {
        addr,
        _shutdown: tx,
    }
}

/// A client that never reuses connections or consults system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
