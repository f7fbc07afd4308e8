//! Static landing page served at `/`.

/// HTML document describing how to call the score endpoint.
pub const LANDING_PAGE: &str = include_str!("landing.html");
