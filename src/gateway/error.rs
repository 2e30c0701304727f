//! Classified API failures
//!
//! Every failure the gateway surfaces is an `ApiError` carrying a numeric
//! status and a user-displayable message, so callers can branch on status
//! without matching on distinct error types.

use serde_json::Value;
use thiserror::Error;

/// Status used when no base URL is configured
pub const STATUS_CONFIGURATION: u16 = 500;

/// Synthetic status for a request that hit the timeout
pub const STATUS_TIMEOUT: u16 = 408;

/// Status for a 2xx response whose body is not JSON
pub const STATUS_INVALID_RESPONSE: u16 = 502;

/// Sentinel status for failures that never produced an HTTP response
pub const STATUS_NETWORK: u16 = 0;

/// Message shown for HTTP 429
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please wait a few minutes and try again.";

/// What kind of failure an `ApiError` represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Base URL missing or request malformed before sending
    Configuration,
    /// Non-2xx response other than 404/429
    Http,
    /// HTTP 429
    RateLimited,
    /// HTTP 404, softened for endpoints the backend may not implement
    NotFound,
    /// The request exceeded the timeout and was aborted
    Timeout,
    /// Connection, DNS or TLS failure
    Network,
    /// 2xx response with an undecodable body
    InvalidResponse,
}

/// A classified failure from a backend call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    /// No base URL configured
    pub fn not_configured() -> Self {
        Self::new(
            ApiErrorKind::Configuration,
            STATUS_CONFIGURATION,
            "API base URL not configured",
        )
    }

    pub fn empty_endpoint() -> Self {
        Self::new(
            ApiErrorKind::Configuration,
            STATUS_CONFIGURATION,
            "Endpoint must not be empty",
        )
    }

    pub fn timeout() -> Self {
        Self::new(ApiErrorKind::Timeout, STATUS_TIMEOUT, "Request timeout")
    }

    pub fn network(detail: impl std::fmt::Display) -> Self {
        Self::new(
            ApiErrorKind::Network,
            STATUS_NETWORK,
            format!("Network error: {detail}"),
        )
    }

    pub fn invalid_response(detail: impl std::fmt::Display) -> Self {
        Self::new(
            ApiErrorKind::InvalidResponse,
            STATUS_INVALID_RESPONSE,
            format!("Invalid JSON response: {detail}"),
        )
    }

    /// Classifies a non-2xx response
    ///
    /// 429 and 404 get fixed messages; anything else uses the body's `message`
    /// field when it is a non-empty string, falling back to `HTTP <status>`.
    pub fn from_status(status: u16, endpoint: &str, body: &[u8]) -> Self {
        match status {
            429 => Self::new(ApiErrorKind::RateLimited, status, RATE_LIMIT_MESSAGE),
            404 => Self::new(
                ApiErrorKind::NotFound,
                status,
                format!("Endpoint not available: {endpoint}"),
            ),
            _ => {
                let message = serde_json::from_slice::<Value>(body)
                    .ok()
                    .and_then(|body| {
                        body.get("message")
                            .and_then(Value::as_str)
                            .filter(|message| !message.is_empty())
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| format!("HTTP {status}"));
                Self::new(ApiErrorKind::Http, status, message)
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind == ApiErrorKind::RateLimited
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ApiErrorKind::Timeout
    }
}
