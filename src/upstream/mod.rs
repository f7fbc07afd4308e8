//! Scoring provider integration.
//!
//! # Data Flow
//! ```text
//! validated address + ApiKey
//!     → client.rs (build URL, GET with key header)
//!     → types.rs (UpstreamOutcome: Success | Rejected | Failed)
//!     → http::response (shaped into the client-facing reply)
//! ```

pub mod client;
pub mod credentials;
pub mod types;

pub use client::ScoreClient;
pub use credentials::ApiKey;
pub use types::{UpstreamError, UpstreamOutcome};
