//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate upstream origins and prefixes
//! - Validate value ranges (preflight status, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no upstreams configured")]
    NoUpstreams,

    #[error("invalid prefix {0:?}: must be non-empty and contain no '/'")]
    InvalidPrefix(String),

    #[error("upstream {prefix:?}: {reason}")]
    InvalidUpstream { prefix: String, reason: &'static str },

    #[error("invalid allowed origin {0:?}")]
    InvalidOrigin(String),

    #[error("preflight status {0} is not a 2xx status")]
    InvalidPreflightStatus(u16),

    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),

    #[error("invalid {field} address {value:?}")]
    InvalidAddress { field: &'static str, value: String },
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstreams.is_empty() {
        errors.push(ValidationError::NoUpstreams);
    }

    for (prefix, origin) in &config.upstreams {
        if prefix.is_empty() || prefix.contains('/') {
            errors.push(ValidationError::InvalidPrefix(prefix.clone()));
        }

        let reason = if !matches!(origin.scheme(), "http" | "https") {
            Some("scheme must be http or https")
        } else if origin.host_str().is_none() {
            Some("origin has no host")
        } else if origin.path() != "/" {
            Some("origin must not carry a path")
        } else if origin.query().is_some() || origin.fragment().is_some() {
            Some("origin must not carry a query or fragment")
        } else {
            None
        };
        if let Some(reason) = reason {
            errors.push(ValidationError::InvalidUpstream {
                prefix: prefix.clone(),
                reason,
            });
        }
    }

    for origin in &config.cors.allowed_origins {
        if origin.is_empty() || origin.ends_with('/') {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    if !(200..=299).contains(&config.cors.preflight_status) {
        errors.push(ValidationError::InvalidPreflightStatus(
            config.cors.preflight_status,
        ));
    }

    for name in &config.headers.strip_extra {
        if HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "metrics",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
