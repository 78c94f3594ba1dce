//! Error types for the conversion service client

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed service call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The service rejected the request (HTTP 400)
    InvalidRequest,
    /// Too many requests (HTTP 429)
    RateLimited,
    /// The service is temporarily down (HTTP 503)
    ServiceUnavailable,
    /// The request exceeded its timeout
    Timeout,
    /// The service could not be reached
    ConnectionError,
    /// The service answered but could not convert the document
    ConversionFailed,
    /// `/health` answered with a non-200 status
    HealthCheckFailed,
    /// Anything else, including undecodable responses
    UnknownError,
}

impl ErrorCode {
    /// All codes, in wire-contract order
    pub const ALL: [ErrorCode; 8] = [
        ErrorCode::InvalidRequest,
        ErrorCode::RateLimited,
        ErrorCode::ServiceUnavailable,
        ErrorCode::Timeout,
        ErrorCode::ConnectionError,
        ErrorCode::ConversionFailed,
        ErrorCode::HealthCheckFailed,
        ErrorCode::UnknownError,
    ];

    /// Wire name, e.g. `RATE_LIMITED`
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::ConnectionError => "CONNECTION_ERROR",
            ErrorCode::ConversionFailed => "CONVERSION_FAILED",
            ErrorCode::HealthCheckFailed => "HEALTH_CHECK_FAILED",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Whether a later attempt may succeed
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorCode::RateLimited
                | ErrorCode::ServiceUnavailable
                | ErrorCode::Timeout
                | ErrorCode::ConnectionError
                | ErrorCode::HealthCheckFailed
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call to the conversion service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ConversionError {
    pub code: ErrorCode,
    pub message: String,
    /// Seconds the service asked us to wait
    pub retry_after: Option<u64>,
}

impl ConversionError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ConversionError>;
