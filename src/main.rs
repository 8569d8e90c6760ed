//! Prefix-routed CORS reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────────┐
//!                         │                    CORS PROXY                     │
//!   Client Request        │  ┌─────────┐    ┌──────────┐    ┌─────────────┐   │
//!   ──────────────────────┼─▶│  http   │───▶│ routing  │───▶│  security   │   │
//!   /<prefix>/<path>?q    │  │ server  │    │ prefix → │    │  headers    │   │
//!                         │  └────┬────┘    │ upstream │    │  sanitize   │   │
//!                         │       │         └──────────┘    └──────┬──────┘   │
//!                         │       │ OPTIONS                        ▼          │
//!                         │       ▼                         ┌─────────────┐   │
//!                         │  ┌─────────┐                    │   http      │───┼──▶ Upstream
//!   Client Response       │  │security │◀───────────────────│  forward    │◀──┼─── Origin
//!   ◀─────────────────────┼──│  cors   │                    └─────────────┘   │
//!                         │  └─────────┘                                      │
//!                         │  config · observability · lifecycle               │
//!                         └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_proxy::config::{load_config, validation::validate_config, ConfigError, ProxyConfig};
use cors_proxy::lifecycle::shutdown_signal;
use cors_proxy::observability::{logging, metrics};
use cors_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "cors-proxy")]
#[command(about = "Prefix-routed reverse proxy with CORS", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Built-in defaults are used when omitted.
    #[arg(short, long, env = "CORS_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long, env = "CORS_PROXY_BIND")]
    bind: Option<String>,
}

fn resolve_config(cli: &Cli) -> Result<ProxyConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("cors-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_file = ?cli.config,
        bind_address = %config.listener.bind_address,
        upstreams = config.upstreams.len(),
        allowed_origins = config.cors.allowed_origins.len(),
        reject_before_forward = config.cors.reject_before_forward,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
