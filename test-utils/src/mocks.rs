//! Mock implementations for testing.
//!
//! This module provides recording implementations of the logging and
//! transport seams for use in tests.

use async_trait::async_trait;
use reqwest::{Request, Response};
use std::sync::{Arc, PoisonError, RwLock};
use svc_common::{Level, LogSink, RequestClient, TransportError};

/// A recorded log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLog {
    /// Log level
    pub level: Level,
    /// Log message
    pub message: String,
}

/// Log sink keeping every line in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    logs: Arc<RwLock<Vec<RecordedLog>>>,
    trace_enabled: bool,
}

impl RecordingSink {
    /// Create a sink with trace disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink reporting every level as enabled.
    #[must_use]
    pub fn with_trace() -> Self {
        Self {
            trace_enabled: true,
            ..Self::default()
        }
    }

    /// Get all recorded entries.
    #[must_use]
    pub fn logs(&self) -> Vec<RecordedLog> {
        self.logs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages starting with `prefix`.
    #[must_use]
    pub fn messages_starting_with(&self, prefix: &str) -> Vec<String> {
        self.logs()
            .into_iter()
            .filter(|log| log.message.starts_with(prefix))
            .map(|log| log.message)
            .collect()
    }

    /// Get log count.
    #[must_use]
    pub fn count(&self) -> usize {
        self.logs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, level: Level, message: &str) {
        self.logs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedLog {
                level,
                message: message.to_string(),
            });
    }

    fn is_enabled(&self, level: Level) -> bool {
        self.trace_enabled || level != Level::Trace
    }
}

/// A request seen by [`CannedClient`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method
    pub method: String,
    /// Target URL
    pub url: String,
    /// Headers in wire order, names lowercased
    pub headers: Vec<(String, String)>,
    /// Buffered body
    pub body: Vec<u8>,
}

impl CapturedRequest {
    /// First value of header `name`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as text.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport answering every request with the same canned reply.
#[derive(Debug, Clone)]
pub struct CannedClient {
    status: u16,
    body: Vec<u8>,
    fail: bool,
    requests: Arc<RwLock<Vec<CapturedRequest>>>,
}

impl CannedClient {
    /// Answer with `status` and `body`.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            fail: false,
            requests: Arc::default(),
        }
    }

    /// Answer 200 with `body`.
    #[must_use]
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    /// Fail every round trip with a transport error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(200, Vec::new())
        }
    }

    /// Requests seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RequestClient for CannedClient {
    async fn execute(&self, request: Request) -> Result<Response, TransportError> {
        let captured = CapturedRequest {
            method: request.method().to_string(),
            url: request.url().to_string(),
            headers: request
                .headers()
                .iter()
                .map(|(k, v)| {
                    (
                        k.as_str().to_string(),
                        String::from_utf8_lossy(v.as_bytes()).into_owned(),
                    )
                })
                .collect(),
            body: request
                .body()
                .and_then(reqwest::Body::as_bytes)
                .map(<[u8]>::to_vec)
                .unwrap_or_default(),
        };
        self.requests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(captured);

        if self.fail {
            return Err(TransportError::invalid_response("connection reset"));
        }

        let status = http::StatusCode::from_u16(self.status)
            .map_err(|e| TransportError::invalid_response(e.to_string()))?;
        let mut response = http::Response::new(self.body.clone());
        *response.status_mut() = status;
        Ok(Response::from(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();

        sink.log(Level::Info, "soapRequest: <a/>");
        sink.log(Level::Error, "boom");

        let logs = sink.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].level, Level::Info);
        assert_eq!(sink.messages_starting_with("soapRequest").len(), 1);
        assert!(!sink.is_enabled(Level::Trace));
        assert!(sink.is_enabled(Level::Info));
        assert!(RecordingSink::with_trace().is_enabled(Level::Trace));
    }

    #[tokio::test]
    async fn test_canned_client_records_requests() {
        let client = CannedClient::new(202, "accepted");
        let mut request = Request::new(
            reqwest::Method::POST,
            reqwest::Url::parse("http://svc.local/soap").unwrap(),
        );
        request
            .headers_mut()
            .insert("X-Test", http::HeaderValue::from_static("1"));
        *request.body_mut() = Some("payload".into());

        let response = client.execute(request).await.unwrap();
        assert_eq!(response.status().as_u16(), 202);
        assert_eq!(response.text().await.unwrap(), "accepted");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].header("x-test"), Some("1"));
        assert_eq!(requests[0].body_text(), "payload");
    }

    #[tokio::test]
    async fn test_failing_client() {
        let client = CannedClient::failing();
        let request = Request::new(
            reqwest::Method::GET,
            reqwest::Url::parse("http://svc.local/").unwrap(),
        );
        assert!(client.execute(request).await.is_err());
        assert_eq!(client.requests().len(), 1);
    }
}
