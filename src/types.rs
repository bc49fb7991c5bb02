use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;
use tracing::debug;

use crate::config::Config;
use crate::error::NoticeError;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Self; 4] = [Self::Success, Self::Error, Self::Warning, Self::Info];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Maps the `type` a caller passed with a notice. Only the exact
    /// lowercase names are recognised; anything else becomes `Info`.
    pub fn coerce(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str() == raw)
            .unwrap_or_else(|| {
                debug!(severity = raw, "unknown severity, falling back to info");
                Self::Info
            })
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forgiving parse for command lines and config files: case and surrounding
/// whitespace are ignored.
impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

static NEXT_NOTICE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique notice identifier. Never reused, not even after a
/// notifier is destroyed and rebuilt.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NoticeId(u64);

impl NoticeId {
    fn next() -> Self {
        Self(NEXT_NOTICE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for NoticeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notif_{}", self.0)
    }
}

/// Externally visible lifecycle status. Being paused by hover is a sub-state
/// of `Active`, not a status of its own.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeStatus {
    Queued,
    Revealed,
    Active,
    Hiding,
    Removed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub message: String,
    pub severity: Severity,
    /// Zero means the notice stays until closed.
    pub duration: Duration,
    pub closable: bool,
    pub created_at: Instant,
}

impl Notice {
    pub(crate) fn new(message: String, severity: Severity, duration: Duration, closable: bool) -> Self {
        Self {
            id: NoticeId::next(),
            message,
            severity,
            duration,
            closable,
            created_at: Instant::now(),
        }
    }

    pub const fn auto_dismisses(&self) -> bool {
        !self.duration.is_zero()
    }
}

/// Untrusted caller input for one notice.
///
/// Every field is optional so the same type can carry what arrives over JSON
/// or from a CLI; [`NoticeRequest::validate`] applies the coercion rules.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct NoticeRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "type")]
    pub severity: Option<String>,
    /// Seconds. Negative or non-finite values fall back to the default.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub closable: Option<bool>,
}

impl NoticeRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    #[must_use]
    pub const fn duration_secs(mut self, secs: f64) -> Self {
        self.duration = Some(secs);
        self
    }

    #[must_use]
    pub const fn closable(mut self, closable: bool) -> Self {
        self.closable = Some(closable);
        self
    }

    /// Checks the message and coerces the rest into a [`Notice`] with a
    /// fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`NoticeError::InvalidMessage`] when the message is missing or
    /// blank after trimming.
    pub fn validate(self, config: &Config) -> Result<Notice, NoticeError> {
        let message = self
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or(NoticeError::InvalidMessage)?
            .to_string();

        let severity = self
            .severity
            .as_deref()
            .map_or(Severity::Info, Severity::coerce);
        let duration = coerce_duration(self.duration, config.default_duration);

        Ok(Notice::new(
            message,
            severity,
            duration,
            self.closable.unwrap_or(true),
        ))
    }
}

fn coerce_duration(secs: Option<f64>, default: Duration) -> Duration {
    match secs {
        Some(secs) if secs >= 0.0 => Duration::try_from_secs_f64(secs).unwrap_or_else(|_| {
            debug!(secs, "duration out of range, using default");
            default
        }),
        Some(secs) => {
            debug!(secs, "invalid duration, using default");
            default
        }
        None => default,
    }
}
