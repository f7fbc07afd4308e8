//! Route lookup.
//!
//! # Responsibilities
//! - Classify a request path as score lookup, landing page or no match
//! - Extract the address segment for score lookups
//!
//! # Design Decisions
//! - Pure function of the raw path; the method is not consulted
//! - Segment comparison is case-sensitive literal equality
//! - Explicit NotFound rather than silent default

/// Leading path segments of the score lookup route.
pub const SCORE_ROUTE_PREFIX: [&str; 2] = ["api", "gitcoin"];

/// Outcome of matching a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision<'a> {
    /// `/api/gitcoin/{address}`; borrows the raw address segment.
    ScoreLookup(&'a str),
    /// `/` or the empty path.
    Landing,
    NotFound,
}

impl RouteDecision<'_> {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RouteDecision::ScoreLookup(_) => "score",
            RouteDecision::Landing => "landing",
            RouteDecision::NotFound => "none",
        }
    }
}

/// Match a raw request path.
///
/// Empty segments are dropped before comparison, so `//api/gitcoin/0x1/`
/// is a score lookup for `0x1`.
pub fn route(path: &str) -> RouteDecision<'_> {
    if path.is_empty() || path == "/" {
        return RouteDecision::Landing;
    }

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let prefix_matches = SCORE_ROUTE_PREFIX
        .iter()
        .all(|expected| segments.next() == Some(*expected));

    match (prefix_matches, segments.next(), segments.next()) {
        (true, Some(address), None) => RouteDecision::ScoreLookup(address),
        _ => RouteDecision::NotFound,
    }
}
