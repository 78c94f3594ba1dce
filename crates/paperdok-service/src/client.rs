//! Conversion service client
//!
//! Speaks the service's JSON protocol over a [`Transport`]:
//!
//! - `GET {base}/health`
//! - `POST {base}/convert-pdf` with `{docx_data, options}`
//!
//! and maps every outcome to a [`ConversionResult`] or a classified
//! [`ConversionError`].

use std::fmt;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::ServiceConfig;
use crate::error::{ConversionError, ErrorCode, Result};
use crate::transport::{HttpTransport, Transport, TransportResponse};

/// Health checks use a fixed short timeout
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Conversion method reported when the service names none
pub const DEFAULT_CONVERSION_METHOD: &str = "docx2pdf_exact";

const DEFAULT_RATE_LIMIT_WAIT: u64 = 30;
const DEFAULT_UNAVAILABLE_WAIT: u64 = 60;

/// Body of a successful `/health` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    /// Every other field the service reports
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// A converted document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub pdf_data: Vec<u8>,
    pub size: usize,
    /// The service's name for the path it used, e.g. `docx2pdf_exact`
    pub conversion_method: String,
    pub processing_time_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(default = "default_success")]
    success: bool,
    pdf_data: Option<String>,
    size: Option<usize>,
    conversion_method: Option<String>,
    processing_time_ms: Option<u64>,
    error: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Delay schedule for [`ConversionClient::convert_with_retry`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Base delay in seconds, doubled on each attempt
    pub backoff_factor: f64,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff_factor: 0.5,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based)
    ///
    /// A server-supplied `retry_after` wins over the backoff schedule.
    /// Either is capped at `max_delay`.
    pub fn delay(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        let delay = match retry_after {
            Some(secs) => Duration::from_secs(secs),
            None => {
                let exponent = attempt.saturating_sub(1).min(16) as i32;
                let secs = self.backoff_factor.max(0.0) * 2f64.powi(exponent);
                Duration::try_from_secs_f64(secs).unwrap_or(self.max_delay)
            }
        };
        delay.min(self.max_delay)
    }
}

/// How the client waits between attempts
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] that blocks the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Client for the DOCX to PDF conversion service
pub struct ConversionClient<T: Transport = HttpTransport> {
    base_url: String,
    transport: T,
    timeout: Duration,
    max_attempts: u32,
    retry: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
}

impl<T: Transport> fmt::Debug for ConversionClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ConversionClient<HttpTransport> {
    /// HTTP client configured from `config`
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> ConversionClient<T> {
    /// Client over any transport
    pub fn with_transport(config: &ServiceConfig, transport: T) -> Self {
        log::debug!("PDF service client for {}", config.base_url());
        Self {
            base_url: config.base_url().to_string(),
            transport,
            timeout: config.timeout(),
            max_attempts: config.max_retries.max(1),
            retry: RetryPolicy {
                backoff_factor: config.backoff_factor,
                ..RetryPolicy::default()
            },
            sleeper: Box::new(ThreadSleeper),
        }
    }

    /// Replace the delay schedule
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace how the client waits between attempts
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configured attempt count
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Query `/health`
    pub fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .transport
            .get(&url, HEALTH_TIMEOUT)
            .map_err(|e| e.into_conversion_error("Health check"))?;

        if response.status != 200 {
            return Err(ConversionError::new(
                ErrorCode::HealthCheckFailed,
                format!("Health check failed with status {}", response.status),
            ));
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            ConversionError::new(
                ErrorCode::UnknownError,
                format!("Health check returned an unreadable body: {}", e),
            )
        })
    }

    /// Whether `/health` currently succeeds
    pub fn is_available(&self) -> bool {
        match self.health() {
            Ok(status) => {
                log::debug!("PDF service healthy: {}", status.status);
                true
            }
            Err(e) => {
                log::debug!("PDF service unavailable: {}", e);
                false
            }
        }
    }

    /// Convert DOCX bytes with a single request
    pub fn convert(&self, docx: &[u8]) -> Result<ConversionResult> {
        if docx.is_empty() {
            return Err(ConversionError::new(
                ErrorCode::InvalidRequest,
                "DOCX data is required",
            ));
        }

        let started = Instant::now();
        let url = format!("{}/convert-pdf", self.base_url);
        let body = json!({
            "docx_data": STANDARD.encode(docx),
            "options": {},
        });
        log::debug!("Sending PDF conversion request ({} bytes of DOCX)", docx.len());

        let response = self
            .transport
            .post_json(&url, &body, self.timeout)
            .map_err(|e| e.into_conversion_error("Conversion"))?;

        let result = classify_response(&response, started)?;
        log::debug!(
            "PDF conversion succeeded via {} in {}ms",
            result.conversion_method,
            result.processing_time_ms
        );
        Ok(result)
    }

    /// Convert with up to `max_attempts` attempts
    ///
    /// Non-retryable errors return at once. Returns the first success or
    /// the last error.
    pub fn convert_with_retry(&self, docx: &[u8], max_attempts: u32) -> Result<ConversionResult> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;
        loop {
            log::debug!("PDF conversion attempt {}/{}", attempt, max_attempts);
            match self.convert(docx) {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => {
                    log::warn!("Non-retryable conversion error: {}", e);
                    return Err(e);
                }
                Err(e) if attempt >= max_attempts => {
                    log::warn!("All {} conversion attempts failed: {}", max_attempts, e);
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.retry.delay(attempt, e.retry_after);
                    log::warn!(
                        "Attempt {} failed: {}. Retrying in {:.1}s",
                        attempt,
                        e,
                        delay.as_secs_f64()
                    );
                    self.sleeper.sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

/// Map a `/convert-pdf` response to its outcome
fn classify_response(response: &TransportResponse, started: Instant) -> Result<ConversionResult> {
    match response.status {
        200 => {}
        400 => {
            return Err(ConversionError::new(
                ErrorCode::InvalidRequest,
                format!("Invalid request: {}", response.text()),
            ))
        }
        429 => {
            return Err(
                ConversionError::new(ErrorCode::RateLimited, "Rate limit exceeded")
                    .with_retry_after(retry_after(response, DEFAULT_RATE_LIMIT_WAIT)),
            )
        }
        503 => {
            return Err(ConversionError::new(
                ErrorCode::ServiceUnavailable,
                "Service temporarily unavailable",
            )
            .with_retry_after(retry_after(response, DEFAULT_UNAVAILABLE_WAIT)))
        }
        status => {
            return Err(ConversionError::new(
                ErrorCode::ConversionFailed,
                format!("Conversion failed with status {}: {}", status, response.text()),
            ))
        }
    }

    let parsed: ConvertResponse = serde_json::from_slice(&response.body).map_err(|e| {
        ConversionError::new(
            ErrorCode::UnknownError,
            format!("Unreadable conversion response: {}", e),
        )
    })?;

    if !parsed.success {
        return Err(ConversionError::new(
            ErrorCode::ConversionFailed,
            parsed
                .error
                .unwrap_or_else(|| "Service reported failure".to_string()),
        ));
    }

    let encoded = parsed.pdf_data.ok_or_else(|| {
        ConversionError::new(ErrorCode::UnknownError, "Response carried no pdf_data")
    })?;
    let pdf_data = STANDARD.decode(encoded.trim()).map_err(|e| {
        ConversionError::new(
            ErrorCode::UnknownError,
            format!("pdf_data is not valid base64: {}", e),
        )
    })?;

    Ok(ConversionResult {
        size: parsed.size.unwrap_or(pdf_data.len()),
        conversion_method: parsed
            .conversion_method
            .unwrap_or_else(|| DEFAULT_CONVERSION_METHOD.to_string()),
        processing_time_ms: parsed
            .processing_time_ms
            .unwrap_or_else(|| started.elapsed().as_millis() as u64),
        pdf_data,
    })
}

fn retry_after(response: &TransportResponse, default: u64) -> u64 {
    response
        .header("retry-after")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_body(pdf: &[u8]) -> Vec<u8> {
        json!({"success": true, "pdf_data": STANDARD.encode(pdf)})
            .to_string()
            .into_bytes()
    }

    #[test]
    fn test_success_defaults() {
        let response = TransportResponse::new(200, ok_body(b"%PDF-1.7"));
        let result = classify_response(&response, Instant::now()).unwrap();
        assert_eq!(result.pdf_data, b"%PDF-1.7");
        assert_eq!(result.size, 8);
        assert_eq!(result.conversion_method, "docx2pdf_exact");
    }

    #[test]
    fn test_success_fields_from_service() {
        let body = json!({
            "success": true,
            "pdf_data": STANDARD.encode(b"%PDF"),
            "size": 99,
            "processing_time_ms": 1234,
            "conversion_method": "libreoffice"
        });
        let response = TransportResponse::new(200, body.to_string());
        let result = classify_response(&response, Instant::now()).unwrap();
        assert_eq!(result.size, 99);
        assert_eq!(result.processing_time_ms, 1234);
        assert_eq!(result.conversion_method, "libreoffice");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (400, ErrorCode::InvalidRequest, None),
            (429, ErrorCode::RateLimited, Some(30)),
            (503, ErrorCode::ServiceUnavailable, Some(60)),
            (500, ErrorCode::ConversionFailed, None),
            (404, ErrorCode::ConversionFailed, None),
        ];
        for (status, code, wait) in cases {
            let err = classify_response(&TransportResponse::new(status, "nope"), Instant::now())
                .unwrap_err();
            assert_eq!(err.code, code, "status {}", status);
            assert_eq!(err.retry_after, wait, "status {}", status);
        }
    }

    #[test]
    fn test_retry_after_header() {
        let response = TransportResponse::new(429, "").with_header("Retry-After", "7");
        let err = classify_response(&response, Instant::now()).unwrap_err();
        assert_eq!(err.retry_after, Some(7));

        let response = TransportResponse::new(503, "").with_header("Retry-After", "soon");
        let err = classify_response(&response, Instant::now()).unwrap_err();
        assert_eq!(err.retry_after, Some(60));
    }

    #[test]
    fn test_reported_failure() {
        let body = json!({"success": false, "error": "corrupt docx"});
        let err = classify_response(&TransportResponse::new(200, body.to_string()), Instant::now())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConversionFailed);
        assert_eq!(err.message, "corrupt docx");
    }

    #[test]
    fn test_undecodable_bodies() {
        let err = classify_response(&TransportResponse::new(200, "<html>"), Instant::now())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownError);

        let body = json!({"success": true, "pdf_data": "***"});
        let err = classify_response(&TransportResponse::new(200, body.to_string()), Instant::now())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownError);

        let body = json!({"success": true});
        let err = classify_response(&TransportResponse::new(200, body.to_string()), Instant::now())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownError);
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(1, None), Duration::from_millis(500));
        assert_eq!(policy.delay(2, None), Duration::from_secs(1));
        assert_eq!(policy.delay(3, None), Duration::from_secs(2));
        assert_eq!(policy.delay(1, Some(5)), Duration::from_secs(5));
        assert_eq!(policy.delay(1, Some(60)), Duration::from_secs(30));
        assert_eq!(policy.delay(40, None), Duration::from_secs(30));
    }
}
