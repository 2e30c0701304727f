//! Gateway configuration
//!
//! Holds the backend location and the timing constants the gateway applies to
//! every call. Values come from the environment at startup; the CLI layers its
//! own flag overrides on top.

use std::env;
use std::time::Duration;

/// Environment variable holding the backend base URL
pub const API_URL_ENV: &str = "SALONADMIN_API_URL";

/// Environment variable overriding the API path prefix
pub const API_PREFIX_ENV: &str = "SALONADMIN_API_PREFIX";

/// Path prefix appended to the base URL when no override is given
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Wall-clock limit for a single network call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// How long a cached resource stays valid for reads
pub const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Settings shared by every request the gateway issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Backend origin, e.g. `https://backend.example.com`; `None` when unset
    pub base_url: Option<String>,
    /// Path prefix between the origin and each endpoint
    pub api_prefix: String,
    /// Timeout applied to each network call
    pub timeout: Duration,
    /// Maximum age of a cache entry
    pub cache_ttl: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: REQUEST_TIMEOUT,
            cache_ttl: CACHE_TTL,
        }
    }
}

impl GatewayConfig {
    /// Creates a config pointing at the given base URL with default timings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Reads the base URL and prefix from the environment
    ///
    /// A missing or blank base URL is kept as `None`; the gateway reports it
    /// on the first request instead of failing here.
    pub fn from_env() -> Self {
        Self::from_values(env::var(API_URL_ENV).ok(), env::var(API_PREFIX_ENV).ok())
    }

    /// Builds a config from optional raw values, applying defaults
    pub fn from_values(base_url: Option<String>, api_prefix: Option<String>) -> Self {
        let base_url = base_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        let api_prefix = api_prefix.unwrap_or_else(|| DEFAULT_API_PREFIX.to_string());

        Self {
            base_url,
            api_prefix,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// Joins base URL, prefix and endpoint into a full URL
    ///
    /// Returns `None` when no base URL is configured.
    pub fn url_for(&self, endpoint: &str) -> Option<String> {
        let base = self.base_url.as_deref()?.trim_end_matches('/');
        Some(format!("{}{}{}", base, self.api_prefix, endpoint))
    }
}
