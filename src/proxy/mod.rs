/// Scoring proxy: the server side of `POST /api/agrifinance`.
///
/// Receives the dashboard's form state, validates it into a
/// [`ScoringRequest`], nests it under `agriFinance`, forwards it to the
/// external scoring service and relays the answer.
///
/// # Reply shape
///
/// | Outcome                         | Status | Body                      |
/// |---------------------------------|--------|---------------------------|
/// | scoring service answered 2xx    | 200*   | service body, verbatim    |
/// | bad body / missing field        | 500    | `{ "error": "..." }`      |
/// | service non-2xx or unreachable  | 500    | `{ "error": "..." }`      |
///
/// \* the service's own 2xx status when `upstream.forward_status` is on.
///
/// There are no retries. Each call is independent and stateless.
use std::time::Instant;

use serde_json::{Value, json};

pub mod error;
pub mod request;
pub mod upstream;

pub use error::ProxyError;
pub use request::ScoringRequest;
pub use upstream::{UpstreamClient, UpstreamReply};


/// The endpoint's reply, ready to be written by the web layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    pub status: u16,
    pub body: Value,
}

impl ProxyReply {
    fn failure(error: &ProxyError) -> Self {
        Self {
            status: 500,
            body: json!({ "error": error.client_message() }),
        }
    }
}

/// Options for the endpoint that are not part of the upstream call itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyOptions {
    /// Relay the upstream 2xx status instead of always answering 200.
    pub forward_status: bool,
}

/// Handle one raw request body end to end.
///
/// Never fails: every error is folded into a 500 reply and logged.
pub fn handle(body: &str, client: &UpstreamClient, options: ProxyOptions) -> ProxyReply {
    let start = Instant::now();

    match forward(body, client) {
        Ok(reply) => {
            log::info!(
                "scoring service answered {} in {}ms",
                reply.status,
                start.elapsed().as_millis()
            );
            ProxyReply {
                status: if options.forward_status {
                    reply.status
                } else {
                    200
                },
                body: reply.body,
            }
        }
        Err(error) => {
            log_failure(&error);
            ProxyReply::failure(&error)
        }
    }
}

/// Validate and forward, surfacing the typed error.
pub fn forward(body: &str, client: &UpstreamClient) -> Result<UpstreamReply, ProxyError> {
    let request = ScoringRequest::from_json(body)?;
    // Field values stay out of the log
    log::debug!(
        "forwarding scoring request via {} {}",
        client.method().as_str(),
        client.url()
    );
    client.score(&request)
}

fn log_failure(error: &ProxyError) {
    let kind = error.kind();
    match error {
        ProxyError::UpstreamStatus { status, body } if !body.is_empty() => {
            log::error!("scoring proxy error kind={kind} status={status}: {body}");
        }
        // The offending value is the caller's input; name the field only
        ProxyError::InvalidField { field, .. } => {
            log::error!("scoring proxy error kind={kind} field={field}");
        }
        _ => log::error!("scoring proxy error kind={kind}: {error}"),
    }
}
