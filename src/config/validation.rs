//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the upstream URL and header name are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("upstream.base_url '{url}' is invalid: {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("upstream.base_url must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("upstream.scorer_id must not be empty")]
    EmptyScorerId,

    #[error("upstream.api_key_env must not be empty")]
    EmptyApiKeyEnv,

    #[error("upstream.api_key_header '{0}' is not a valid header name")]
    InvalidApiKeyHeader(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let upstream = &config.upstream;
    match Url::parse(&upstream.base_url) {
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
            errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl {
            url: upstream.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if upstream.scorer_id.trim().is_empty() {
        errors.push(ValidationError::EmptyScorerId);
    }

    if upstream.api_key_env.trim().is_empty() {
        errors.push(ValidationError::EmptyApiKeyEnv);
    }

    if HeaderName::from_bytes(upstream.api_key_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidApiKeyHeader(
            upstream.api_key_header.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
