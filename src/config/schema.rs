/// Configuration schema and defaults for agrifinance.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[server]`, `[upstream]`, `[client]`, and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values they
/// want to override.
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The scoring service the proxy forwards to.
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://h3un7vgepphw3mosuok4h4jnv40nzdya.lambda-url.us-east-1.on.aws/";

/// Default listen address for `agrifinance serve`.
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level agrifinance configuration.
///
/// Maps directly to the `~/.agrifinance/config.toml` and `.agrifinance.toml`
/// file schemas. Missing sections and fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgriFinanceConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Web dashboard server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the dashboard listens on.
    pub addr: String,
    /// Open the dashboard in the default browser on start-up.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [upstream]
// ---------------------------------------------------------------------------

/// HTTP method used for the outbound scoring call.
///
/// The scoring service has historically been called with `GET` carrying a
/// JSON body. `Post` is available for deployments that accept it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamMethod {
    #[default]
    Get,
    Post,
}

impl UpstreamMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for UpstreamMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
        }
    }
}

/// Outbound scoring service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scoring service URL.
    pub url: String,
    /// Method for the outbound call: `get` or `post`.
    pub method: UpstreamMethod,
    /// Request timeout in milliseconds. `0` waits indefinitely.
    ///
    /// The server runs one uncapped thread per request, so with `0` a hung
    /// scoring service keeps a thread blocked for every pending submission.
    /// Set a finite value on exposed deployments.
    pub timeout_ms: u64,
    /// Relay the upstream status code on success instead of always `200`.
    pub forward_status: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            method: UpstreamMethod::default(),
            timeout_ms: 0,
            forward_status: false,
        }
    }
}

// ---------------------------------------------------------------------------
// [client]
// ---------------------------------------------------------------------------

/// Settings for `agrifinance submit`, the terminal dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of a running agrifinance proxy.
    pub proxy_url: String,
    /// Timeout for the call to the proxy in milliseconds. `0` waits indefinitely.
    pub timeout_ms: u64,
}

impl ClientConfig {
    /// `timeout_ms` as a duration, `None` when unset.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: format!("http://{DEFAULT_ADDR}"),
            timeout_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level printed: `"error"`, `"warn"`, `"info"`, `"debug"`.
    pub level: String,
    /// Also append log lines as JSONL to `path`.
    pub file_enabled: bool,
    /// Path to the JSONL log file. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            path: "~/.agrifinance/server.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl AgriFinanceConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `agrifinance config init` to create a starting config file
    /// with all settings documented.
    pub fn default_toml() -> String {
        format!(
            r#"# agrifinance Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (AGRIFINANCE_*)
#   2. Project config (.agrifinance.toml in current directory)
#   3. User global config (~/.agrifinance/config.toml)
#   4. Built-in defaults

[server]
addr = "{DEFAULT_ADDR}"
open_browser = true

[upstream]
url = "{DEFAULT_UPSTREAM_URL}"
method = "get"              # get | post
# 0 = wait indefinitely. Requests get one thread each with no cap, so a
# hung scoring service holds a thread per pending request until it answers.
timeout_ms = 0
forward_status = false      # true relays the scoring service's status code

[client]
proxy_url = "http://{DEFAULT_ADDR}"
timeout_ms = 0              # 0 = wait indefinitely

[logging]
level = "info"              # error | warn | info | debug
file_enabled = false
path = "~/.agrifinance/server.jsonl"
"#
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
