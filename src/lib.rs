//! Passport score proxy library.
//!
//! Serves `GET /api/gitcoin/{address}` by forwarding to the scoring provider
//! with a server-held API key, then reshaping the reply with CORS and cache
//! headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::ProxyConfig;
pub use http::{build_app, HttpServer};
pub use lifecycle::Shutdown;
pub use upstream::ApiKey;
