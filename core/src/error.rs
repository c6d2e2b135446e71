//! Error types for the SDK client.
//!
//! # Design
//! Every failure on the request path is normalized into a single `SdkError`
//! whose `kind` callers branch on. The HTTP status is only ever attached to
//! `ErrorKind::ApiError`; the fields are private so no other combination can
//! be constructed. Construction-time problems are a separate `ConfigError`
//! and never appear on the request path.

use std::fmt;

use thiserror::Error;

/// Classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The server answered with a non-2xx status.
    ApiError,

    /// The configured timeout elapsed before the server answered.
    Timeout,

    /// The transport failed for a reason other than the timeout.
    NetworkError,

    /// Anything that fits none of the above.
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ApiError => "API_ERROR",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only error returned by `SdkClient` request methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{kind}] {message}")]
pub struct SdkError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
}

impl SdkError {
    pub fn api(status: u16, status_text: &str) -> Self {
        let reason = status_text.trim();
        let message = if reason.is_empty() {
            format!("API request failed: {status}")
        } else {
            format!("API request failed: {status} {reason}")
        };
        Self {
            kind: ErrorKind::ApiError,
            message,
            status: Some(status),
        }
    }

    pub fn timeout(timeout_ms: u64) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            message: format!("Request timeout after {timeout_ms}ms"),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NetworkError,
            message: message.into(),
            status: None,
        }
    }

    pub fn unknown() -> Self {
        Self {
            kind: ErrorKind::UnknownError,
            message: "Unknown error occurred".to_string(),
            status: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status of the failed response. Only set for `ErrorKind::ApiError`.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

/// Errors raised while building a client from its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("an API key is required")]
    MissingApiKey,

    #[error("invalid value for {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },
}
