//! Scoring provider client.
//!
//! # Responsibilities
//! - Build the score URL for an address
//! - Issue one GET with the API key header injected
//! - Classify the response as success, rejection, or failure
//!
//! No retries. The call, body read included, is bounded by one deadline; an
//! expired deadline is a `Failed` outcome like any other transport error.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};
use reqwest::header::ACCEPT;
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::credentials::ApiKey;
use crate::upstream::types::{UpstreamError, UpstreamOutcome};

/// HTTP client bound to one scoring provider and scorer.
#[derive(Clone)]
pub struct ScoreClient {
    http: reqwest::Client,
    /// Base URL with any trailing slash removed.
    base_url: String,
    scorer_id: String,
    api_key_header: HeaderName,
    deadline: Duration,
}

impl ScoreClient {
    /// Create a new client from upstream configuration.
    ///
    /// `deadline` bounds each score fetch from send to fully read body.
    pub fn new(config: &UpstreamConfig, deadline: Duration) -> Result<Self, UpstreamError> {
        let api_key_header = HeaderName::from_bytes(config.api_key_header.as_bytes())
            .map_err(|_| UpstreamError::InvalidHeaderName(config.api_key_header.clone()))?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("passport-proxy/", env!("CARGO_PKG_VERSION")));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build()?;

        // Fail at construction rather than on the first request.
        Url::parse(&config.base_url)?;

        tracing::info!(
            base_url = %config.base_url,
            scorer_id = %config.scorer_id,
            deadline_secs = deadline.as_secs(),
            "Score client initialized"
        );

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            scorer_id: config.scorer_id.clone(),
            api_key_header,
            deadline,
        })
    }

    /// URL of the score resource for `address`.
    ///
    /// The address is inserted as-is; it comes from an already percent-encoded
    /// request path and cannot contain `/`, `?` or `#`.
    pub fn score_url(&self, address: &str) -> Result<Url, UpstreamError> {
        let url = format!(
            "{}/v2/stamps/{}/score/{}",
            self.base_url, self.scorer_id, address
        );
        Ok(Url::parse(&url)?)
    }

    /// Fetch the score for `address`. Makes exactly one attempt.
    pub async fn fetch_score(&self, address: &str, api_key: &ApiKey) -> UpstreamOutcome {
        let attempt = tokio::time::timeout(self.deadline, self.try_fetch(address, api_key)).await;
        let result =
            attempt.unwrap_or_else(|_| Err(UpstreamError::Timeout(self.deadline.as_secs())));
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(address = %address, kind = e.kind(), error = %e, "Upstream call failed");
                UpstreamOutcome::Failed(e)
            }
        };
        metrics::record_upstream(outcome.label());
        outcome
    }

    async fn try_fetch(
        &self,
        address: &str,
        api_key: &ApiKey,
    ) -> Result<UpstreamOutcome, UpstreamError> {
        let url = self.score_url(address)?;

        let mut key = HeaderValue::from_str(api_key.expose())
            .map_err(|_| UpstreamError::InvalidCredential)?;
        key.set_sensitive(true);

        let response = self
            .http
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(self.api_key_header.clone(), key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            tracing::warn!(address = %address, status = %status, "Upstream rejected score request");
            return Ok(UpstreamOutcome::Rejected { status, body });
        }

        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)?;
        tracing::debug!(address = %address, status = %status, "Upstream score received");
        Ok(UpstreamOutcome::Success(body))
    }
}
