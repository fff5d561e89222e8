/// Client side of the dashboard: submit the form to the scoring proxy.
///
/// Mirrors what the browser page does: `POST {proxy}/api/agrifinance` with
/// the form as JSON, and read `agri_score` from the reply.
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use super::form::FormState;
use super::score::ScoreResult;

/// Path of the scoring proxy endpoint.
pub const PROXY_PATH: &str = "/api/agrifinance";

/// Message shown when a failure has no text of its own.
pub const FALLBACK_MESSAGE: &str = "Failed to submit data. Please try again.";

/// Why a submission produced no score.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// The proxy answered with a non-2xx status.
    #[error("Server returned {status}: {status_text}")]
    Http { status: u16, status_text: String },

    /// The proxy could not be reached.
    #[error("{0}")]
    Transport(String),

    /// The reply was not JSON.
    #[error("{0}")]
    Decode(String),
}

impl SubmitError {
    /// Banner text for this error.
    pub fn message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }
}

/// Synchronous client for a running agrifinance proxy.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    base_url: String,
    timeout: Option<Duration>,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn endpoint(&self) -> String {
        format!("{}{PROXY_PATH}", self.base_url)
    }

    /// Submit the form and read the score.
    pub fn submit(&self, form: &FormState) -> Result<ScoreResult, SubmitError> {
        let mut call = ureq::post(&self.endpoint()).set("Content-Type", "application/json");
        if let Some(timeout) = self.timeout {
            call = call.timeout(timeout);
        }

        let response = match call.send_json(form) {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                return Err(SubmitError::Http {
                    status,
                    status_text: response.status_text().to_string(),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(SubmitError::Transport(transport.to_string()));
            }
        };

        let body: Value = response
            .into_json()
            .map_err(|e| SubmitError::Decode(e.to_string()))?;

        Ok(ScoreResult::from_value(&body))
    }
}
