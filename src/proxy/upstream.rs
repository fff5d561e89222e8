/// HTTP client for the external scoring service.
///
/// Uses the synchronous `ureq` client. The service has historically been
/// called with `GET` and a JSON body; `ureq` 2.x sends the body regardless of
/// method, so the configured method is used as-is.
use std::time::Duration;

use serde_json::Value;

use super::error::ProxyError;
use super::request::ScoringRequest;
use crate::config::schema::{UpstreamConfig, UpstreamMethod};

/// Upper bound on a relayed error body kept for logging.
const ERROR_BODY_LIMIT: usize = 512;

/// A successful answer from the scoring service.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    /// The response body, as JSON. A non-JSON body is kept as a JSON string.
    pub body: Value,
}

/// Synchronous scoring service client.
///
/// Built once per server from [`UpstreamConfig`] and shared by all request
/// threads; it holds no mutable state.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    url: String,
    method: UpstreamMethod,
    timeout: Option<Duration>,
}

impl UpstreamClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self {
            url: config.url.clone(),
            method: config.method,
            timeout: (config.timeout_ms > 0).then(|| Duration::from_millis(config.timeout_ms)),
        }
    }

    /// Client for an explicit URL with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: UpstreamMethod::default(),
            timeout: None,
        }
    }

    pub fn with_method(mut self, method: UpstreamMethod) -> Self {
        self.method = method;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> UpstreamMethod {
        self.method
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Forward a validated request and return the service's answer.
    ///
    /// Non-2xx answers become [`ProxyError::UpstreamStatus`]; connection and
    /// I/O failures become [`ProxyError::Transport`].
    pub fn score(&self, request: &ScoringRequest) -> Result<UpstreamReply, ProxyError> {
        let mut call = ureq::request(self.method.as_str(), &self.url)
            .set("Content-Type", "application/json");
        if let Some(timeout) = self.timeout {
            call = call.timeout(timeout);
        }

        let response = match call.send_json(request.envelope()) {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let mut body = response.into_string().unwrap_or_default();
                body.truncate(floor_char_boundary(&body, ERROR_BODY_LIMIT));
                return Err(ProxyError::UpstreamStatus { status, body });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ProxyError::Transport(transport.to_string()));
            }
        };

        let status = response.status();
        let text = response
            .into_string()
            .map_err(|e| ProxyError::Transport(format!("failed to read scoring response: {e}")))?;

        Ok(UpstreamReply {
            status,
            body: parse_body(text),
        })
    }
}

/// Parse a response body as JSON, falling back to a JSON string.
fn parse_body(text: String) -> Value {
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => Value::String(text),
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
