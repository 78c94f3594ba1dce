//! # paperdok-service
//!
//! Client for the remote DOCX to PDF conversion service.
//!
//! - [`ConversionClient`]: health check, single conversion and
//!   [`convert_with_retry`](ConversionClient::convert_with_retry)
//! - [`ErrorCode`] / [`ConversionError`]: the eight wire error codes
//! - [`ServiceConfig`]: URL, timeout and retry settings with environment
//!   overrides
//! - [`Transport`]: the seam between protocol and HTTP, for testing
//!
//! ## Example
//!
//! ```no_run
//! use paperdok_service::{ConversionClient, ServiceConfig};
//!
//! let config = ServiceConfig::from_env();
//! let client = ConversionClient::from_config(&config)?;
//! if client.is_available() {
//!     let pdf = client.convert_with_retry(b"PK...", config.max_retries)?;
//!     assert!(pdf.pdf_data.starts_with(b"%PDF"));
//! }
//! # Ok::<(), paperdok_service::ConversionError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::{
    ConversionClient, ConversionResult, HealthStatus, RetryPolicy, Sleeper, ThreadSleeper,
};
pub use config::ServiceConfig;
pub use error::{ConversionError, ErrorCode, Result};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
