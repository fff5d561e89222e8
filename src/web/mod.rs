//! Embedded web dashboard and scoring proxy.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The single-page scoring dashboard
//! - `POST /api/agrifinance`, the scoring proxy
//! - Small JSON helpers: score views (`/api/view`) and settings (`/api/health`)
//!
//! Launched via `agrifinance serve` (default: `http://127.0.0.1:3000`).

mod api;
mod frontend;

pub use frontend::render_index;

use std::io::{Cursor, Read};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::config::AgriFinanceConfig;
use crate::proxy::{ProxyOptions, UpstreamClient};

/// Shared, read-only context for request handlers.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub client: UpstreamClient,
    pub options: ProxyOptions,
}

impl AppContext {
    pub fn from_config(config: &AgriFinanceConfig) -> Self {
        Self {
            client: UpstreamClient::from_config(&config.upstream),
            options: ProxyOptions {
                forward_status: config.upstream.forward_status,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the given address.
///
/// Blocks the current thread. Each request is handled on its own thread so a
/// slow scoring call only holds up the request that made it. Errors are
/// handled per-request without stopping the server.
///
/// Threads are not capped: with `upstream.timeout_ms = 0` a hung scoring
/// service keeps one thread per pending request alive until it answers.
pub fn serve(addr: &str, ctx: AppContext, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("agrifinance dashboard running at http://{addr}");
    println!(
        "Forwarding scores to {} {}",
        ctx.client.method().as_str(),
        ctx.client.url()
    );
    println!("Press Ctrl+C to stop.\n");

    if open {
        // Best-effort
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            log::debug!("could not open browser: {e}");
        }
    }

    let ctx = Arc::new(ctx);
    for request in server.incoming_requests() {
        let ctx = Arc::clone(&ctx);
        thread::spawn(move || handle_request(request, &ctx));
    }

    Ok(())
}

/// Read, dispatch, respond, log.
fn handle_request(mut request: Request, ctx: &AppContext) {
    let start = Instant::now();
    let method = request.method().clone();
    let url = request.url().to_string();

    let reply = match read_body(request.as_reader(), &method) {
        Ok(body) => dispatch(ctx, &method, &url, body.as_deref()).unwrap_or_else(|e| {
            log::error!("{method} {url}: {e:#}");
            Reply::error(500, &e.to_string())
        }),
        Err(e) => {
            log::warn!("failed to read request body for {url}: {e}");
            Reply::error(500, &format!("failed to read request body: {e}"))
        }
    };

    let status = reply.status;
    if let Err(e) = request.respond(reply.into_response()) {
        log::warn!("failed to send response for {url}: {e}");
    }

    // Brief access log
    log::info!("{method} {url} {status} {}ms", start.elapsed().as_millis());
}

/// Read the body up-front for methods that carry one. A body that cannot be
/// read in full (I/O error, invalid UTF-8) is an error, never a partial body.
fn read_body(mut reader: impl Read, method: &Method) -> std::io::Result<Option<String>> {
    if !matches!(method, Method::Put | Method::Post | Method::Patch) {
        return Ok(None);
    }
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    Ok(Some(buf))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
pub(crate) fn dispatch(
    ctx: &AppContext,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<Reply> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => serve_frontend(),

        // API
        (&Method::Post, "/api/agrifinance") => Ok(api::post_agrifinance(ctx, body.unwrap_or(""))),
        (&Method::Get, "/api/view") => api::get_view(url),
        (&Method::Get, "/api/health") => api::get_health(ctx),

        // 404
        _ => Ok(Reply::error(404, "not found")),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// A handler's answer, turned into a `tiny_http` response at the edge.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Reply {
    pub status: u16,
    pub html: bool,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            html: false,
            body: body.into_bytes(),
        }
    }

    pub fn html(body: String) -> Self {
        Self {
            status: 200,
            html: true,
            body: body.into_bytes(),
        }
    }

    /// `{ "error": message }` with the given status.
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }).to_string())
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let content_type = if self.html {
            content_type_html()
        } else {
            content_type_json()
        };
        Response::from_data(self.body)
            .with_header(content_type)
            .with_status_code(StatusCode(self.status))
    }
}

/// Serve the dashboard page, rendered from the initial dashboard state.
fn serve_frontend() -> Result<Reply> {
    let html = render_index(&crate::dashboard::DashboardState::default())
        .context("failed to render dashboard page")?;
    Ok(Reply::html(html))
}

/// JSON content type header.
fn content_type_json() -> Header {
    header("Content-Type", "application/json; charset=utf-8")
}

/// HTML content type header.
fn content_type_html() -> Header {
    header("Content-Type", "text/html; charset=utf-8")
}

fn header(name: &'static str, value: &'static str) -> Header {
    // Static ASCII name/value pairs are always valid headers
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .unwrap_or_else(|()| unreachable!("invalid static header {name}"))
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
