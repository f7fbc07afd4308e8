//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID for tracing)
//!     → routing (score lookup / landing / not found)
//!     → upstream (score lookups only)
//!     → response.rs (status, CORS and cache headers, body)
//!     → Send to client
//! ```

pub mod landing;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{build_app, AppState, HttpServer};
