//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use passport_proxy::ProxyConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;

/// A scoring provider stand-in listening on an ephemeral port.
#[allow(dead_code)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    calls: Arc<AtomicU32>,
    last_request: Arc<Mutex<Option<String>>>,
}

#[allow(dead_code)]
impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of connections accepted so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Request line and headers of the latest call, lowercased.
    pub fn last_request(&self) -> Option<String> {
        self.last_request.lock().unwrap().clone()
    }
}

/// Start a mock upstream that always answers with `status` and `body`.
#[allow(dead_code)]
pub async fn start_fixed_upstream(status: u16, body: &'static str) -> MockUpstream {
    start_programmable_upstream(move || async move { (status, body.to_string()) }).await
}

/// Start a programmable mock upstream with async support.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> MockUpstream
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let last_request = Arc::new(Mutex::new(None));
    let f = Arc::new(f);

    let task_calls = calls.clone();
    let task_last = last_request.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            task_calls.fetch_add(1, Ordering::SeqCst);
            let f = f.clone();
            let last = task_last.clone();
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                *last.lock().unwrap() = Some(head.to_ascii_lowercase());

                let (status, body) = f().await;
                let reason = StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown");
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockUpstream {
        addr,
        calls,
        last_request,
    }
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() > 16 * 1024 {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Proxy config pointed at `upstream_base`, with no system proxy and no metrics.
pub fn proxy_config(upstream_base: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.base_url = upstream_base.to_string();
    config.upstream.use_system_proxy = false;
    config.observability.metrics_enabled = false;
    config
}

/// Drive one request through the in-process router.
#[allow(dead_code)]
pub async fn send(app: &Router, method: Method, path: &str) -> (StatusCode, HeaderMap, Bytes) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body)
}

/// Header value as text, if present.
#[allow(dead_code)]
pub fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
