//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the single catch-all handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener with graceful shutdown
//! - Run the score pipeline: route → validate → method gate → credential
//!   → upstream → shape

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, Uri},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::request::{request_id, request_id_layer};
use crate::http::response;
use crate::observability::metrics;
use crate::routing::{route, validate_address, RouteDecision};
use crate::upstream::{ApiKey, ScoreClient, UpstreamError};

/// Application state injected into handlers. Read-only after construction.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<ScoreClient>,
    pub api_key: Option<ApiKey>,
    pub strict_methods: bool,
}

impl AppState {
    pub fn new(config: &ProxyConfig, api_key: Option<ApiKey>) -> Result<Self, UpstreamError> {
        // Only the upstream call can stall, so the deadline lives there and
        // an expired one is shaped like any other upstream failure.
        let deadline = Duration::from_secs(config.timeouts.request_secs);
        Ok(Self {
            upstream: Arc::new(ScoreClient::new(&config.upstream, deadline)?),
            api_key,
            strict_methods: config.score.strict_methods,
        })
    }
}

/// Build the fully layered router for `config`.
///
/// Used by [`HttpServer`] and directly by in-process tests.
pub fn build_app(config: &ProxyConfig, api_key: Option<ApiKey>) -> Result<Router, UpstreamError> {
    let state = AppState::new(config, api_key)?;
    Ok(build_router(state))
}

/// Build the Axum router with all middleware layers.
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(proxy_handler))
        .route("/{*path}", any(proxy_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id(request),
            )
        }))
        .layer(request_id_layer())
}

/// HTTP server for the score proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and credential.
    pub fn new(config: ProxyConfig, api_key: Option<ApiKey>) -> Result<Self, UpstreamError> {
        if api_key.is_none() {
            tracing::warn!(
                env = %config.upstream.api_key_env,
                "API key not configured; score lookups will return 500"
            );
        }
        let router = build_app(&config, api_key)?;
        Ok(Self { router })
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main handler. Every path lands here; routing is done by [`route`].
async fn proxy_handler(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let start_time = Instant::now();
    let decision = route(uri.path());

    tracing::debug!(method = %method, route = decision.label(), "Dispatching request");

    let response = match decision {
        RouteDecision::ScoreLookup(address) => score_lookup(&state, &method, address).await,
        RouteDecision::Landing => response::landing(),
        RouteDecision::NotFound => {
            tracing::warn!(path = %uri.path(), "No route matched");
            response::not_found()
        }
    };

    metrics::record_request(
        method.as_str(),
        response.status().as_u16(),
        decision.label(),
        start_time,
    );
    response
}

async fn score_lookup(state: &AppState, method: &Method, address: &str) -> Response {
    if let Err(e) = validate_address(address) {
        tracing::warn!(address = %address, reason = %e, "Rejected address");
        return response::invalid_address();
    }

    if method == Method::OPTIONS {
        return response::preflight();
    }

    if state.strict_methods && method != Method::GET && method != Method::HEAD {
        tracing::warn!(method = %method, "Method not allowed on score route");
        return response::method_not_allowed();
    }

    let Some(api_key) = state.api_key.as_ref() else {
        tracing::warn!("Score lookup without configured API key");
        return response::missing_api_key();
    };

    let outcome = state.upstream.fetch_score(address, api_key).await;
    response::from_upstream(&outcome)
}
