use thiserror::Error;

/// Message used when an error renders to an empty string.
pub const FALLBACK_MESSAGE: &str = "Failed to process request";

/// Everything that can go wrong between receiving a scoring request and
/// relaying the scoring service's answer.
///
/// All variants collapse to the same `500 { "error": ... }` reply at the
/// endpoint boundary; the variant only shapes the message and the log line.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Request body is not JSON, or not a JSON object.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// A required numeric field is absent or null.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A required numeric field holds something that is not a number.
    #[error("field '{field}' is not numeric: {value}")]
    InvalidField {
        field: &'static str,
        value: String,
    },

    /// The scoring service answered with a non-2xx status.
    #[error("Request failed with status code {status}")]
    UpstreamStatus { status: u16, body: String },

    /// The scoring service could not be reached or the exchange broke off.
    #[error("{0}")]
    Transport(String),
}

impl ProxyError {
    /// Short machine-readable name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidBody(_) => "invalid_body",
            Self::MissingField(_) => "missing_field",
            Self::InvalidField { .. } => "invalid_field",
            Self::UpstreamStatus { .. } => "upstream_status",
            Self::Transport(_) => "transport",
        }
    }

    /// The message sent back to the caller.
    pub fn client_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }
}
