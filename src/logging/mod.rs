//! Logger set-up for the proxy and dashboard server.
//!
//! Call sites use the `log` macros. [`init`] installs an `env_logger` backend
//! writing `HH:MM:SS LEVEL message` to stderr, filtered by
//! `[logging] level` (and `RUST_LOG` when set). When
//! `[logging] file_enabled = true` every emitted record is also appended to a
//! JSONL file (default `~/.agrifinance/server.jsonl`). File I/O is
//! best-effort: a failing log sink never fails a request.

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::Serialize;

use crate::config::schema::LoggingConfig;

/// Console logger plus the optional JSONL file sink.
pub struct Logger {
    console: env_logger::Logger,
    file: Option<PathBuf>,
}

impl Logger {
    /// Build the logger described by `config` without installing it.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let file = if config.file_enabled {
            crate::config::expand_home(&config.path)
        } else {
            None
        };

        let console = env_logger::Builder::new()
            .filter_level(parse_level(&config.level))
            .parse_env(env_logger::Env::default())
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} {} {}",
                    Local::now().format("%H:%M:%S").to_string().dimmed(),
                    level_label(record.level()),
                    record.args()
                )
            })
            .build();

        Self { console, file }
    }

    /// Most verbose level this logger emits.
    pub fn filter(&self) -> LevelFilter {
        self.console.filter()
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.console.matches(record) {
            return;
        }
        self.console.log(record);

        if let Some(path) = &self.file {
            let _ = append_line(path, record);
        }
    }

    fn flush(&self) {
        self.console.flush();
    }
}

/// Install the process-wide logger from config. Later calls are ignored.
pub fn init(config: &LoggingConfig) {
    let logger = Logger::from_config(config);
    let level = logger.filter();

    // Already set (e.g. in tests)
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }
}

/// `[logging] level` as a filter. Unknown names fall back to `info`.
fn parse_level(val: &str) -> LevelFilter {
    match val.to_ascii_lowercase().as_str() {
        "warning" => LevelFilter::Warn,
        other => other.parse().unwrap_or(LevelFilter::Info),
    }
}

fn level_label(level: Level) -> colored::ColoredString {
    match level {
        Level::Error => "ERROR".red().bold(),
        Level::Warn => "WARN ".yellow().bold(),
        Level::Info => "INFO ".green(),
        Level::Debug => "DEBUG".dimmed(),
        Level::Trace => "TRACE".dimmed(),
    }
}

/// One JSONL record in the file sink.
#[derive(Serialize)]
struct LogRecord {
    timestamp: String,
    level: String,
    message: String,
}

fn append_line(path: &Path, record: &Record) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let entry = LogRecord {
        timestamp: Utc::now().to_rfc3339(),
        level: record.level().as_str().to_ascii_lowercase(),
        message: record.args().to_string(),
    };
    let line = serde_json::to_string(&entry).map_err(std::io::Error::other)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
