use anyhow::Result;
use clap::{Parser, Subcommand};

use agrifinance::{cli, config, logging};

#[derive(Debug, Parser)]
#[command(name = "agrifinance")]
#[command(about = "Agricultural land financial scoring proxy and dashboard")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the web dashboard and the scoring proxy
    Serve {
        /// Address to listen on (default from config: 127.0.0.1:3000)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open the dashboard in a browser
        #[arg(long)]
        no_open: bool,
    },
    /// Submit one scoring request to a running proxy and show the result
    Submit {
        /// Region: afar, amhara, oromia, tigray, somali, snnpr
        #[arg(long)]
        region: Option<String>,
        /// Crop: potato, maize, wheat, coffee, teff, barley, sorghum
        #[arg(long)]
        crop: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        latitude: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        longitude: Option<String>,
        /// Land area in hectares
        #[arg(long)]
        land_area: Option<String>,
        /// Yield estimation year
        #[arg(long)]
        year: Option<String>,
        /// Base URL of the proxy (default from config)
        #[arg(long)]
        proxy: Option<String>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Manage configuration: show, init, set, reset
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective merged configuration
    Show,
    /// Write a default config file to ~/.agrifinance/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `upstream.method post`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();
    logging::init(&cfg.logging);

    match app.command {
        Commands::Serve { addr, no_open } => cli::run_serve(&cfg, addr.as_deref(), no_open),
        Commands::Submit {
            region,
            crop,
            latitude,
            longitude,
            land_area,
            year,
            proxy,
            format,
        } => {
            let fields = cli::SubmitFields {
                region,
                crop_type: crop,
                latitude,
                longitude,
                land_area,
                yield_estimation_year: year,
            };
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_submit(&cfg, &fields, proxy.as_deref(), fmt)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
