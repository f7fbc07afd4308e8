//! Upstream outcome and error definitions.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that end an upstream call without a usable response.
///
/// Display output is what callers see in the `error` field of a 500, so the
/// transport and decode variants forward the underlying message untouched.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connect, TLS, DNS, or body read failure.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response whose body is not JSON.
    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    /// The call did not finish within the configured deadline.
    #[error("upstream request timed out after {0} seconds")]
    Timeout(u64),

    /// The score URL could not be built from base URL and address.
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    /// The API key contains bytes that cannot go into a header.
    #[error("API key is not a valid header value")]
    InvalidCredential,

    /// The configured API key header name is not a valid header name.
    #[error("invalid API key header name: {0}")]
    InvalidHeaderName(String),
}

impl UpstreamError {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Decode(_) => "decode",
            UpstreamError::Url(_) => "url",
            UpstreamError::InvalidCredential => "credential",
            UpstreamError::InvalidHeaderName(_) => "header",
            UpstreamError::Timeout(_) => "timeout",
        }
    }
}

/// Result of exactly one upstream attempt.
#[derive(Debug)]
pub enum UpstreamOutcome {
    /// 2xx with a JSON body, kept opaque.
    Success(serde_json::Value),

    /// Non-2xx; body kept as raw text.
    Rejected { status: StatusCode, body: String },

    /// The call or its decoding failed.
    Failed(UpstreamError),
}

impl UpstreamOutcome {
    /// Stable label for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            UpstreamOutcome::Success(_) => "success",
            UpstreamOutcome::Rejected { .. } => "rejected",
            UpstreamOutcome::Failed(_) => "failed",
        }
    }
}
