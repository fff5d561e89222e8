//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a [`Reply`] with
//! JSON content.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::dashboard::ScoreView;
use crate::proxy;

use super::{AppContext, Reply};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Health API response.
#[derive(Serialize)]
struct HealthResponse {
    version: &'static str,
    upstream_url: String,
    upstream_method: String,
    /// `None` when the upstream call waits indefinitely.
    upstream_timeout_ms: Option<u64>,
    forward_status: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Reply> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Reply::json(200, body))
}

/// Parse the `?raw=N` query parameter from a URL.
fn parse_raw_param(url: &str) -> Option<f64> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == "raw" {
            v.parse::<f64>().ok().filter(|f| f.is_finite())
        } else {
            None
        }
    })
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `POST /api/agrifinance`: the scoring proxy.
///
/// Never fails at this layer: proxy errors are already folded into a 500
/// reply with an `error` message.
pub fn post_agrifinance(ctx: &AppContext, body: &str) -> Reply {
    let reply = proxy::handle(body, &ctx.client, ctx.options);
    Reply::json(reply.status, reply.body.to_string())
}

/// `GET /api/view?raw=N`: gauge, band and labels for a raw score.
///
/// A missing or unparseable `raw` yields the no-data view.
pub fn get_view(url: &str) -> Result<Reply> {
    let view = match parse_raw_param(url) {
        Some(raw) => ScoreView::from_raw(raw),
        None => ScoreView::empty(),
    };
    json_response(&view)
}

/// `GET /api/health`: effective proxy settings.
pub fn get_health(ctx: &AppContext) -> Result<Reply> {
    let resp = HealthResponse {
        version: env!("CARGO_PKG_VERSION"),
        upstream_url: ctx.client.url().to_string(),
        upstream_method: ctx.client.method().to_string(),
        upstream_timeout_ms: ctx.client.timeout().map(|t| t.as_millis() as u64),
        forward_status: ctx.options.forward_status,
    };

    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::{ProxyOptions, UpstreamClient};

    fn body_json(reply: &Reply) -> serde_json::Value {
        serde_json::from_slice(&reply.body).unwrap()
    }

    #[test]
    fn parse_raw_param_extracts_value() {
        assert_eq!(parse_raw_param("/api/view?raw=680"), Some(680.0));
        assert_eq!(parse_raw_param("/api/view?x=1&raw=612.5"), Some(612.5));
    }

    #[test]
    fn parse_raw_param_returns_none_for_missing_or_invalid() {
        assert_eq!(parse_raw_param("/api/view"), None);
        assert_eq!(parse_raw_param("/api/view?raw="), None);
        assert_eq!(parse_raw_param("/api/view?raw=abc"), None);
        assert_eq!(parse_raw_param("/api/view?raw=inf"), None);
    }

    #[test]
    fn view_for_680_is_green_excellent() {
        let reply = get_view("/api/view?raw=680").unwrap();
        assert_eq!(reply.status, 200);
        let body = body_json(&reply);
        assert_eq!(body["raw_display"], "680");
        assert_eq!(body["percentage_display"], "80.0");
        assert_eq!(body["color"], "#10b981");
        assert_eq!(body["label"], "Excellent Potential");
        assert_eq!(body["band"], "excellent");
        assert!(body["gauge_svg"].as_str().unwrap().starts_with("<svg"));
    }

    #[test]
    fn view_without_raw_is_no_data() {
        let body = body_json(&get_view("/api/view").unwrap());
        assert_eq!(body["label"], "No Data");
        assert_eq!(body["raw_score"], 0.0);
    }

    #[test]
    fn health_reports_upstream_settings() {
        let ctx = AppContext {
            client: UpstreamClient::new("http://scores.test/"),
            options: ProxyOptions {
                forward_status: true,
            },
        };
        let body = body_json(&get_health(&ctx).unwrap());
        assert_eq!(body["upstream_url"], "http://scores.test/");
        assert_eq!(body["upstream_method"], "get");
        assert!(body["upstream_timeout_ms"].is_null());
        assert_eq!(body["forward_status"], true);
    }
}
