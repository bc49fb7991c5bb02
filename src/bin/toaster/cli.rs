use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use humantime::parse_duration;
use toaster::Severity;
use toaster::telemetry::LogFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive toast notifications through their lifecycle", long_about = None)]
pub struct Cli {
    /// Path of the TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Message to show; repeat for a burst of notices.
    #[arg(long = "message", short = 'm', value_name = "TEXT")]
    pub messages: Vec<String>,

    /// Severity applied to every `--message` (success, error, warning, info).
    #[arg(long, default_value_t = Severity::Info)]
    pub severity: Severity,

    /// Display time in seconds for `--message` notices.
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub duration: Option<f64>,

    /// Keep `--message` notices until they are closed.
    #[arg(long, action = ArgAction::SetTrue)]
    pub sticky: bool,

    /// Hide the close button of `--message` notices.
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_close: bool,

    /// File of JSON notice requests, one per line.
    #[arg(long, value_name = "PATH")]
    pub requests: Option<PathBuf>,

    /// Remove every notice with this exact message after `--close-after`.
    #[arg(long, value_name = "TEXT")]
    pub close: Option<String>,

    /// Delay before `--close` is applied (e.g. "2s").
    #[arg(long, value_parser = parse_duration, default_value = "1s")]
    pub close_after: Duration,

    /// Print the rendered document before tearing it down.
    #[arg(long, action = ArgAction::SetTrue)]
    pub print_document: bool,

    /// Log output: full, compact or json (`--features json-logs`).
    #[arg(long, value_name = "FORMAT", default_value_t = LogFormat::Full)]
    pub log_format: LogFormat,

    /// Explicit log filter (e.g. "toaster=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
