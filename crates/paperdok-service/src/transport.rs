//! The wire under the protocol
//!
//! [`ConversionClient`](crate::ConversionClient) speaks the JSON protocol
//! and classifies errors. It sends bytes through a [`Transport`], so tests
//! can script responses without a server.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{ConversionError, ErrorCode};

/// An HTTP response reduced to what the protocol reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Header values keyed by lowercase name
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Why a request produced no response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Timeout(String),
    Connect(String),
    Other(String),
}

impl TransportError {
    /// Classify as a service error
    pub fn into_conversion_error(self, context: &str) -> ConversionError {
        match self {
            TransportError::Timeout(msg) => {
                ConversionError::new(ErrorCode::Timeout, format!("{} timed out: {}", context, msg))
            }
            TransportError::Connect(msg) => ConversionError::new(
                ErrorCode::ConnectionError,
                format!("Cannot connect to PDF service: {}", msg),
            ),
            TransportError::Other(msg) => {
                ConversionError::new(ErrorCode::UnknownError, format!("{} failed: {}", context, msg))
            }
        }
    }
}

/// Blocking request/response exchange
pub trait Transport {
    fn get(&self, url: &str, timeout: Duration) -> Result<TransportResponse, TransportError>;

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] over a blocking reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Client whose requests time out after `timeout` unless overridden
    pub fn new(timeout: Duration) -> Result<Self, ConversionError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("paperdok/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ConversionError::new(
                    ErrorCode::UnknownError,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;
        Ok(Self { client })
    }

    fn finish(
        response: reqwest::Result<reqwest::blocking::Response>,
    ) -> Result<TransportResponse, TransportError> {
        let response = response.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.bytes().map_err(classify)?.to_vec();
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<TransportResponse, TransportError> {
        Self::finish(self.client.get(url).timeout(timeout).send())
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        Self::finish(self.client.post(url).json(body).timeout(timeout).send())
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}
