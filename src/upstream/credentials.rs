//! Server-held API key for the scoring provider.

use std::fmt;
use std::sync::Arc;

/// API key presented to the scoring provider.
///
/// Never empty. `Debug` is redacted so the key cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    /// Wrap a key, treating the empty string as "not configured".
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value.into()))
        }
    }

    /// Read the key from an environment variable.
    ///
    /// Unset, empty and non-UTF-8 values all count as absent.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().and_then(Self::new)
    }

    /// The raw key, for building the outbound header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}
