//! CLI command implementations for agrifinance.
//!
//! Provides subcommand handlers for:
//! - `agrifinance serve`: web dashboard and scoring proxy
//! - `agrifinance submit`: one scoring round-trip rendered in the terminal
//! - `agrifinance config show|init|set|reset`: configuration management

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::config::{self, AgriFinanceConfig};
use crate::dashboard::form::FormError;
use crate::dashboard::gauge;
use crate::dashboard::state::SUCCESS_MESSAGE;
use crate::dashboard::{
    Action, Band, DashboardState, FormField, ProxyClient, Status, reduce, submit_once,
};
use crate::web::{self, AppContext};

/// Output format for `submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// agrifinance serve
// ---------------------------------------------------------------------------

/// Run the web dashboard. `addr` overrides `server.addr`.
pub fn run_serve(cfg: &AgriFinanceConfig, addr: Option<&str>, no_open: bool) -> Result<()> {
    let addr = addr.unwrap_or(&cfg.server.addr);
    let open = cfg.server.open_browser && !no_open;
    web::serve(addr, AppContext::from_config(cfg), open)
}

// ---------------------------------------------------------------------------
// agrifinance submit
// ---------------------------------------------------------------------------

/// Raw field values given on the command line. Unset fields keep the form
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct SubmitFields {
    pub region: Option<String>,
    pub crop_type: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub land_area: Option<String>,
    pub yield_estimation_year: Option<String>,
}

impl SubmitFields {
    /// Parse the given fields into form edits, in form order.
    pub fn edits(&self) -> Result<Vec<FormField>, FormError> {
        [
            ("region", &self.region),
            ("latitude", &self.latitude),
            ("longitude", &self.longitude),
            ("land_area", &self.land_area),
            ("crop_type", &self.crop_type),
            ("yield_estimation_year", &self.yield_estimation_year),
        ]
        .into_iter()
        .filter_map(|(name, raw)| raw.as_deref().map(|raw| FormField::parse(name, raw)))
        .collect()
    }
}

/// Submit one scoring request through a running proxy and print the result.
///
/// Returns an error (non-zero exit) when the submission fails; the error
/// banner is printed first either way.
pub fn run_submit(
    cfg: &AgriFinanceConfig,
    fields: &SubmitFields,
    proxy_url: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let edits = fields.edits().context("invalid form field")?;
    let state = edits.into_iter().fold(DashboardState::default(), |state, field| {
        reduce(state, Action::Edit(field)).0
    });

    let client = proxy_client(cfg, proxy_url);
    let state = submit_once(state, &client);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary_json(&state))?),
        OutputFormat::Table => print_submit_table(&state, &client),
    }

    if let Some(message) = state.error() {
        bail!("{message}");
    }
    Ok(())
}

/// Client for the configured proxy; `proxy_url` overrides `client.proxy_url`.
fn proxy_client(cfg: &AgriFinanceConfig, proxy_url: Option<&str>) -> ProxyClient {
    let client = ProxyClient::new(proxy_url.unwrap_or(&cfg.client.proxy_url));
    match cfg.client.timeout() {
        Some(timeout) => client.with_timeout(timeout),
        None => client,
    }
}

fn summary_json(state: &DashboardState) -> serde_json::Value {
    let view = state.view();
    serde_json::json!({
        "form": state.form,
        "raw_score": view.raw_score,
        "percentage": view.percentage,
        "band": view.band,
        "label": view.label,
        "description": view.description,
        "color": view.color,
        "status": state.status,
    })
}

fn print_submit_table(state: &DashboardState, client: &ProxyClient) {
    let form = &state.form;
    let view = state.view();

    println!("{}", "AgriFinance Score".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {} {}", "Proxy:      ".bold(), client.endpoint().dimmed());
    println!("  {} {}", "Region:     ".bold(), form.region.label());
    println!("  {} {}", "Crop:       ".bold(), form.crop_type.label());
    println!(
        "  {} {}, {}",
        "Location:   ".bold(),
        form.latitude,
        form.longitude
    );
    println!("  {} {} ha", "Land area:  ".bold(), form.land_area);
    println!("  {} {}", "Year:       ".bold(), form.yield_estimation_year);
    println!();

    println!("  {}", gauge::terminal_bar(view.percentage, 30));
    println!("  {} {} / 850", "Score:      ".bold(), view.raw_display);
    println!(
        "  {} {}",
        "Potential:  ".bold(),
        colorize_band(view.band, view.label)
    );
    println!("  {} {}", " ".repeat(12), view.description.dimmed());
    println!();

    match &state.status {
        Status::Success => println!("  {} {}", "✓".green().bold(), SUCCESS_MESSAGE),
        Status::Error(message) => println!("  {} {}", "✗".red().bold(), message.red()),
        Status::Idle => {}
    }
}

/// Colorize a band label with its gauge color.
fn colorize_band(band: Band, label: &str) -> colored::ColoredString {
    match band {
        Band::Excellent => label.green().bold(),
        Band::Moderate => label.yellow().bold(),
        Band::Limited => label.red().bold(),
        Band::NoData => label.dimmed(),
    }
}

// ---------------------------------------------------------------------------
// agrifinance config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective agrifinance Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    // Show source info
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.agrifinance/config.toml", global_exists);
    print_source(".agrifinance.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "AGRIFINANCE_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.agrifinance/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to point at another scoring service or change ports.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
