/// Configuration system for agrifinance.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::AgriFinanceConfig::default()`]
/// 2. **User global config**: `~/.agrifinance/config.toml`
/// 3. **Project local config**: `.agrifinance.toml` in the current working directory
/// 4. **Environment variables**: `AGRIFINANCE_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Missing sections in a TOML file fall
/// back to built-in defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use agrifinance::config;
///
/// let cfg = config::load();
/// let client = agrifinance::proxy::UpstreamClient::from_config(&cfg.upstream);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::AgriFinanceConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved agrifinance configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> AgriFinanceConfig {
    let mut config = AgriFinanceConfig::default();

    // Layer 2: user global config (~/.agrifinance/config.toml)
    if let Some(global) = load_toml_file(global_config_path()) {
        config = global;
    }

    // Layer 3: project local config (.agrifinance.toml)
    if let Some(project) = load_toml_file(project_config_path()) {
        config = project;
    }

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A broken config file never stops the server.
///
/// Each file is deserialized with `serde(default)`, so keys a file leaves out
/// come back as built-in defaults and a later file replaces an earlier one
/// wholesale.
fn load_toml_file(path: Option<PathBuf>) -> Option<AgriFinanceConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory for agrifinance's own files: `~/.agrifinance`.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".agrifinance"))
}

/// Path to the user global config: `~/.agrifinance/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    home_dir().map(|dir| dir.join("config.toml"))
}

/// Path to the project local config: `.agrifinance.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".agrifinance.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// `lookup` resolves a variable name; [`load`] passes the process
/// environment. Supported variables:
/// - `AGRIFINANCE_ADDR`: dashboard listen address
/// - `AGRIFINANCE_UPSTREAM_URL`: scoring service URL
/// - `AGRIFINANCE_UPSTREAM_METHOD`: `get` or `post`
/// - `AGRIFINANCE_UPSTREAM_TIMEOUT_MS`: outbound timeout (`0` = none)
/// - `AGRIFINANCE_FORWARD_STATUS`: relay the upstream status (`1`/`true`)
/// - `AGRIFINANCE_PROXY_URL`: proxy base URL for `agrifinance submit`
/// - `AGRIFINANCE_CLIENT_TIMEOUT_MS`: timeout for `agrifinance submit`
/// - `AGRIFINANCE_LOG_LEVEL`: `error`, `warn`, `info`, `debug`
///
/// Empty values and values that do not parse are ignored.
fn apply_env_overrides(config: &mut AgriFinanceConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("AGRIFINANCE_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }

    // Upstream
    if let Some(val) = lookup("AGRIFINANCE_UPSTREAM_URL")
        && !val.is_empty()
    {
        config.upstream.url = val;
    }
    if let Some(val) = lookup("AGRIFINANCE_UPSTREAM_METHOD")
        && let Some(method) = parse_method(&val)
    {
        config.upstream.method = method;
    }
    if let Some(val) = lookup("AGRIFINANCE_UPSTREAM_TIMEOUT_MS")
        && let Ok(ms) = val.trim().parse::<u64>()
    {
        config.upstream.timeout_ms = ms;
    }
    if let Some(val) = lookup("AGRIFINANCE_FORWARD_STATUS") {
        config.upstream.forward_status = is_truthy(&val);
    }

    // Client
    if let Some(val) = lookup("AGRIFINANCE_PROXY_URL")
        && !val.is_empty()
    {
        config.client.proxy_url = val;
    }
    if let Some(val) = lookup("AGRIFINANCE_CLIENT_TIMEOUT_MS")
        && let Ok(ms) = val.trim().parse::<u64>()
    {
        config.client.timeout_ms = ms;
    }

    if let Some(val) = lookup("AGRIFINANCE_LOG_LEVEL")
        && !val.is_empty()
    {
        config.logging.level = val.to_ascii_lowercase();
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse an upstream method string.
fn parse_method(val: &str) -> Option<schema::UpstreamMethod> {
    match val.to_ascii_lowercase().as_str() {
        "get" => Some(schema::UpstreamMethod::Get),
        "post" => Some(schema::UpstreamMethod::Post),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.agrifinance/config.toml`.
///
/// Creates the directory if it doesn't exist. Returns an error if the file
/// already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.agrifinance/ directory")?;
    }

    fs::write(&path, AgriFinanceConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like `upstream.method`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let toml_str = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&AgriFinanceConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&toml_str).context("failed to parse config as TOML value")?;

    set_toml_value(&mut value_table, key, value)?;

    // Reject edits that would leave the file unloadable (e.g. method = "put")
    let _: AgriFinanceConfig = value_table
        .clone()
        .try_into()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    let output =
        toml::to_string_pretty(&value_table).context("failed to serialize updated config")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section_path, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config key must be dotted, e.g. 'upstream.url' (got '{key}')");
    };

    // Navigate to the parent table
    let mut current = root;
    for part in section_path.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section_path}'"))?;

    // Parse according to the type of the existing value
    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("config key not found: '{leaf}' in '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
