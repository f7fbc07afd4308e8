//! Response shaping.
//!
//! # Responsibilities
//! - Map every pipeline outcome to status, headers and body
//! - Attach CORS headers to all non-landing responses
//! - Apply cache policy: cacheable score and landing page, `no-store` errors
//!
//! Header sets are part of the public contract; clients and CDNs depend on
//! them exactly as written here.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Serialize;
use serde_json::{Number, Value};

use crate::http::landing::LANDING_PAGE;
use crate::upstream::UpstreamOutcome;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

pub const SCORE_CACHE_CONTROL: &str = "public, max-age=600";
pub const LANDING_CACHE_CONTROL: &str = "public, max-age=3600";
pub const NO_STORE: &str = "no-store";

pub const INVALID_ADDRESS: &str = "Invalid Ethereum address";
pub const MISSING_API_KEY: &str = "API key not configured";
pub const NOT_FOUND: &str = "Not found";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const INTERNAL_ERROR_FALLBACK: &str = "Internal server error";

/// CDN-targeted mirrors of `Cache-Control` on score responses.
pub const CDN_CACHE_CONTROL: HeaderName = HeaderName::from_static("cdn-cache-control");
pub const CLOUDFLARE_CDN_CACHE_CONTROL: HeaderName =
    HeaderName::from_static("cloudflare-cdn-cache-control");

const APPLICATION_JSON: &str = "application/json";
const TEXT_HTML: &str = "text/html";

/// JSON error payload. `message` is only present for upstream rejections.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

/// Which CORS headers a response carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cors {
    /// `Access-Control-Allow-Origin` only.
    Origin,
    /// Origin plus allowed methods and headers.
    Preflight,
}

fn cors_headers(cors: Cors) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    if cors == Cors::Preflight {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
    }
    headers
}

fn finish(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn json(status: StatusCode, mut headers: HeaderMap, body: Vec<u8>) -> Response {
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    finish(status, headers, Body::from(body))
}

fn error_json(
    status: StatusCode,
    cors: Cors,
    no_store: bool,
    error: &str,
    message: Option<&str>,
) -> Response {
    let mut headers = cors_headers(cors);
    if no_store {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    }
    // A struct of two strings always serializes.
    let body = serde_json::to_vec(&ErrorBody { error, message }).unwrap_or_default();
    json(status, headers, body)
}

/// 400 for an address that fails validation.
pub fn invalid_address() -> Response {
    error_json(StatusCode::BAD_REQUEST, Cors::Preflight, false, INVALID_ADDRESS, None)
}

/// 200 with an empty body answering a CORS preflight.
pub fn preflight() -> Response {
    finish(StatusCode::OK, cors_headers(Cors::Preflight), Body::empty())
}

/// 500 when no API key is configured.
pub fn missing_api_key() -> Response {
    error_json(
        StatusCode::INTERNAL_SERVER_ERROR,
        Cors::Origin,
        true,
        MISSING_API_KEY,
        None,
    )
}

/// 405 for methods rejected in strict mode.
pub fn method_not_allowed() -> Response {
    let mut response = error_json(
        StatusCode::METHOD_NOT_ALLOWED,
        Cors::Preflight,
        true,
        METHOD_NOT_ALLOWED,
        None,
    );
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(ALLOW_METHODS));
    response
}

/// 500 carrying an error message, or the fixed fallback when it is empty.
pub fn internal_error(message: &str) -> Response {
    let message = if message.is_empty() {
        INTERNAL_ERROR_FALLBACK
    } else {
        message
    };
    error_json(
        StatusCode::INTERNAL_SERVER_ERROR,
        Cors::Origin,
        true,
        message,
        None,
    )
}

/// 404 for paths outside the route table.
pub fn not_found() -> Response {
    error_json(StatusCode::NOT_FOUND, Cors::Origin, true, NOT_FOUND, None)
}

/// Static landing page. Carries no CORS headers.
pub fn landing() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_HTML));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(LANDING_CACHE_CONTROL),
    );
    finish(StatusCode::OK, headers, Body::from(LANDING_PAGE))
}

/// Cacheable 200 re-serializing the upstream JSON.
///
/// Floats with an integral value are written as integers (`1.0` becomes `1`).
pub fn score(body: &Value) -> Response {
    let mut body = body.clone();
    integral_floats_to_ints(&mut body);
    let bytes = match serde_json::to_vec(&body) {
        Ok(bytes) => bytes,
        Err(e) => return internal_error(&e.to_string()),
    };

    let mut headers = cors_headers(Cors::Origin);
    let policy = HeaderValue::from_static(SCORE_CACHE_CONTROL);
    headers.insert(header::CACHE_CONTROL, policy.clone());
    headers.insert(CDN_CACHE_CONTROL, policy.clone());
    headers.insert(CLOUDFLARE_CDN_CACHE_CONTROL, policy);
    json(StatusCode::OK, headers, bytes)
}

// i64 covers every integral f64 below 2^63; larger ones stay floats.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn integral_floats_to_ints(value: &mut Value) {
    match value {
        Value::Number(n) => {
            if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < I64_BOUND {
                    *n = Number::from(f as i64);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(integral_floats_to_ints),
        Value::Object(map) => map.values_mut().for_each(integral_floats_to_ints),
        _ => {}
    }
}

/// Upstream non-2xx: keep its status, wrap its raw body text.
pub fn upstream_rejected(status: StatusCode, body: &str) -> Response {
    let error = format!("API error: {}", status.as_u16());
    error_json(status, Cors::Origin, true, &error, Some(body))
}

/// Shape the result of the upstream call.
pub fn from_upstream(outcome: &UpstreamOutcome) -> Response {
    match outcome {
        UpstreamOutcome::Success(body) => score(body),
        UpstreamOutcome::Rejected { status, body } => upstream_rejected(*status, body),
        UpstreamOutcome::Failed(e) => internal_error(&e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamError;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let response = invalid_address();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(header(&response, "access-control-allow-origin"), Some("*"));
        assert_eq!(header(&response, "access-control-allow-methods"), Some("GET, OPTIONS"));
        assert_eq!(header(&response, "access-control-allow-headers"), Some("Content-Type"));
        assert_eq!(header(&response, "content-type"), Some("application/json"));
        assert_eq!(header(&response, "cache-control"), None);
        assert_eq!(body_string(response).await, r#"{"error":"Invalid Ethereum address"}"#);
    }

    #[tokio::test]
    async fn test_preflight() {
        let response = preflight();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().len(), 3);
        assert_eq!(header(&response, "content-type"), None);
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let response = missing_api_key();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(header(&response, "cache-control"), Some("no-store"));
        assert_eq!(header(&response, "access-control-allow-methods"), None);
        assert_eq!(body_string(response).await, r#"{"error":"API key not configured"}"#);
    }

    #[tokio::test]
    async fn test_upstream_rejected() {
        let response = upstream_rejected(StatusCode::TOO_MANY_REQUESTS, "rate limited");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(header(&response, "cache-control"), Some("no-store"));
        assert_eq!(
            body_string(response).await,
            r#"{"error":"API error: 429","message":"rate limited"}"#
        );
    }

    #[tokio::test]
    async fn test_upstream_rejected_body_is_not_reparsed() {
        let response = upstream_rejected(StatusCode::NOT_FOUND, r#"{"detail":"x"}"#);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"API error: 404","message":"{\"detail\":\"x\"}"}"#
        );
    }

    #[tokio::test]
    async fn test_score() {
        let value: serde_json::Value =
            serde_json::from_str(r#"{ "score": 12.3, "address": "0xabc" }"#).unwrap();
        let response = score(&value);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "cache-control"), Some("public, max-age=600"));
        assert_eq!(header(&response, "cdn-cache-control"), Some("public, max-age=600"));
        assert_eq!(
            header(&response, "cloudflare-cdn-cache-control"),
            Some("public, max-age=600")
        );
        assert_eq!(header(&response, "access-control-allow-origin"), Some("*"));
        assert_eq!(
            body_string(response).await,
            r#"{"score":12.3,"address":"0xabc"}"#
        );
    }

    #[tokio::test]
    async fn test_score_writes_integral_floats_as_integers() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{"score": 1.0, "n": 1e2, "x": 12.5, "z": -0.0, "list": [2.0, 3], "big": 1e300}"#,
        )
        .unwrap();
        assert_eq!(
            body_string(score(&value)).await,
            r#"{"score":1,"n":100,"x":12.5,"z":0,"list":[2,3],"big":1e300}"#
        );
    }

    #[tokio::test]
    async fn test_internal_error_fallback() {
        let response = internal_error("");
        assert_eq!(body_string(response).await, r#"{"error":"Internal server error"}"#);

        let response = internal_error("boom");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(header(&response, "cache-control"), Some("no-store"));
        assert_eq!(body_string(response).await, r#"{"error":"boom"}"#);
    }

    #[tokio::test]
    async fn test_failed_outcome_uses_error_message() {
        let response = from_upstream(&UpstreamOutcome::Failed(UpstreamError::InvalidCredential));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"API key is not a valid header value"}"#
        );
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(header(&response, "access-control-allow-origin"), Some("*"));
        assert_eq!(header(&response, "cache-control"), Some("no-store"));
        assert_eq!(body_string(response).await, r#"{"error":"Not found"}"#);
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let response = method_not_allowed();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(header(&response, "allow"), Some("GET, OPTIONS"));
        assert_eq!(header(&response, "cache-control"), Some("no-store"));
        assert_eq!(body_string(response).await, r#"{"error":"Method not allowed"}"#);
    }

    #[tokio::test]
    async fn test_landing() {
        let response = landing();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "content-type"), Some("text/html"));
        assert_eq!(header(&response, "cache-control"), Some("public, max-age=3600"));
        assert_eq!(header(&response, "access-control-allow-origin"), None);
        assert!(body_string(response).await.contains("/api/gitcoin/"));
    }
}
