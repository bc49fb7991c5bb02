//! Log subscriber setup for the `toaster` binary and for hosts that embed the
//! notifier without a subscriber of their own.

use std::fmt::{self, Display};
use std::str::FromStr;

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt as tracing_fmt, layer::SubscriberExt};

use crate::Result;
use crate::error::Error;

const DEFAULT_DIRECTIVE: &str = "info";

/// Output shape of the log lines.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Human-readable lines with targets.
    #[default]
    Full,
    /// One short line per event, no target.
    Compact,
    /// Flattened JSON objects; needs the `json-logs` feature.
    Json,
}

impl LogFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Compact => "compact",
            Self::Json => "json",
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other} (full, compact, json)")),
        }
    }
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Fails when `explicit_filter` does not parse, when [`LogFormat::Json`] is
/// asked for without the `json-logs` feature, or when a global subscriber is
/// already installed.
pub fn init_tracing(explicit_filter: Option<&str>, format: LogFormat) -> Result<()> {
    #[cfg(not(feature = "json-logs"))]
    if format == LogFormat::Json {
        return Err(Error::Telemetry(
            "binary was built without the `json-logs` feature".to_string(),
        ));
    }

    let env = std::env::var("RUST_LOG").ok();
    let filter = resolve_filter(explicit_filter, env.as_deref())?;

    let subscriber = Registry::default()
        .with(filter)
        .with((format == LogFormat::Full).then(|| tracing_fmt::layer().with_target(true)))
        .with((format == LogFormat::Compact).then(|| tracing_fmt::layer().compact().with_target(false)));
    #[cfg(feature = "json-logs")]
    let subscriber = subscriber
        .with((format == LogFormat::Json).then(|| tracing_fmt::layer().json().flatten_event(true)));

    subscriber
        .try_init()
        .map_err(|err| Error::Telemetry(err.to_string()))
}

/// An explicit filter must parse. A broken `RUST_LOG` is skipped in favour
/// of the default directive.
fn resolve_filter(explicit: Option<&str>, env: Option<&str>) -> Result<EnvFilter> {
    if let Some(directives) = explicit {
        return EnvFilter::try_new(directives)
            .map_err(|err| Error::Telemetry(format!("invalid log filter {directives:?}: {err}")));
    }
    if let Some(filter) = env.and_then(|directives| EnvFilter::try_new(directives).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(DEFAULT_DIRECTIVE).map_err(|err| Error::Telemetry(err.to_string()))
}
