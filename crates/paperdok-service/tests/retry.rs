//! Retry and health behavior against a scripted transport

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use paperdok_service::{
    ConversionClient, ErrorCode, ServiceConfig, Sleeper, Transport, TransportError,
    TransportResponse,
};
use serde_json::{json, Value};

type Reply = Result<TransportResponse, TransportError>;

/// Replays queued replies and records every request
#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<(String, Option<Value>)>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::default(),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next(&self, url: &str, body: Option<&Value>) -> Reply {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), body.cloned()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("script exhausted".into())))
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str, _timeout: Duration) -> Reply {
        self.next(url, None)
    }

    fn post_json(&self, url: &str, body: &Value, _timeout: Duration) -> Reply {
        self.next(url, Some(body))
    }
}

#[derive(Clone, Default)]
struct RecordingSleeper(Arc<Mutex<Vec<Duration>>>);

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.0.lock().unwrap().push(duration);
    }
}

fn pdf_reply() -> Reply {
    Ok(TransportResponse::new(
        200,
        json!({"success": true, "pdf_data": STANDARD.encode(b"%PDF-1.7 test")}).to_string(),
    ))
}

fn client(replies: Vec<Reply>) -> (ConversionClient<ScriptedTransport>, RecordingSleeper) {
    let sleeper = RecordingSleeper::default();
    let config = ServiceConfig {
        url: "http://pdf.test/".to_string(),
        ..ServiceConfig::default()
    };
    let client = ConversionClient::with_transport(&config, ScriptedTransport::new(replies))
        .with_sleeper(sleeper.clone());
    (client, sleeper)
}

#[test]
fn rate_limited_then_success_takes_two_calls() {
    let (client, sleeper) = client(vec![
        Ok(TransportResponse::new(429, "").with_header("Retry-After", "2")),
        pdf_reply(),
    ]);

    let result = client.convert_with_retry(b"PK\x03\x04docx", 3).unwrap();
    assert!(result.pdf_data.starts_with(b"%PDF"));
    assert_eq!(client.transport().calls(), 2);
    assert_eq!(*sleeper.0.lock().unwrap(), vec![Duration::from_secs(2)]);
}

#[test]
fn request_envelope() {
    let (client, _) = client(vec![pdf_reply()]);
    client.convert(b"docx-bytes").unwrap();

    let requests = client.transport().requests.lock().unwrap();
    let (url, body) = &requests[0];
    assert_eq!(url, "http://pdf.test/convert-pdf");
    let body = body.as_ref().unwrap();
    assert_eq!(body["docx_data"], STANDARD.encode(b"docx-bytes"));
    assert_eq!(body["options"], json!({}));
}

#[test]
fn non_retryable_error_stops_immediately() {
    let (client, sleeper) = client(vec![
        Ok(TransportResponse::new(400, "bad docx")),
        pdf_reply(),
    ]);
    let err = client.convert_with_retry(b"docx", 3).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidRequest);
    assert_eq!(client.transport().calls(), 1);
    assert!(sleeper.0.lock().unwrap().is_empty());
}

#[test]
fn exhausted_attempts_return_last_error() {
    let (client, sleeper) = client(vec![
        Err(TransportError::Connect("refused".into())),
        Err(TransportError::Timeout("30s".into())),
        Ok(TransportResponse::new(503, "")),
    ]);
    let err = client.convert_with_retry(b"docx", 3).unwrap_err();
    assert_eq!(err.code, ErrorCode::ServiceUnavailable);
    assert_eq!(client.transport().calls(), 3);
    assert_eq!(
        *sleeper.0.lock().unwrap(),
        vec![Duration::from_millis(500), Duration::from_secs(1)]
    );
}

#[test]
fn zero_attempts_still_tries_once() {
    let (client, _) = client(vec![pdf_reply()]);
    assert!(client.convert_with_retry(b"docx", 0).is_ok());
    assert_eq!(client.transport().calls(), 1);
}

#[test]
fn health_reports_status_and_details() {
    let (client, _) = client(vec![Ok(TransportResponse::new(
        200,
        json!({"status": "healthy", "version": "2.1", "queue": 0}).to_string(),
    ))]);
    let health = client.health().unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.details["version"], "2.1");
    assert_eq!(client.transport().requests.lock().unwrap()[0].0, "http://pdf.test/health");
}

#[test]
fn health_failures_are_classified() {
    let (client, _) = client(vec![
        Ok(TransportResponse::new(500, "")),
        Err(TransportError::Timeout("10s".into())),
        Err(TransportError::Connect("refused".into())),
    ]);
    assert_eq!(client.health().unwrap_err().code, ErrorCode::HealthCheckFailed);
    assert_eq!(client.health().unwrap_err().code, ErrorCode::Timeout);
    assert!(!client.is_available());
}

#[test]
#[ignore = "needs a running conversion service at PDF_SERVICE_URL"]
fn live_service_health() {
    let config = ServiceConfig::from_env();
    let client = ConversionClient::from_config(&config).unwrap();
    let health = client.health().unwrap();
    assert!(!health.status.is_empty());
}
