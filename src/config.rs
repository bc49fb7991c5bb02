use std::path::Path;
use std::time::Duration;

use humantime::parse_duration;
use serde::Deserialize;
use serde_with::{DeserializeAs, serde_as};

use crate::Result;
use crate::error::ConfigError;
use crate::types::Severity;

const DEFAULT_STAGGER_STEP: Duration = Duration::from_millis(150);
const DEFAULT_HIDE_TRANSITION: Duration = Duration::from_millis(450);
const DEFAULT_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Offset between consecutive reveals inside one render pass.
    pub stagger_step: Duration,
    /// Length of the hide animation handed to the renderer.
    pub hide_transition: Duration,
    /// Used when a caller passes a negative, non-finite or missing duration.
    pub default_duration: Duration,
    pub durations: SeverityDurations,
    pub allow_html: bool,
}

/// Default display time of the per-severity shortcuts (`success`, `error`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityDurations {
    pub success: Duration,
    pub error: Duration,
    pub warning: Duration,
    pub info: Duration,
}

impl SeverityDurations {
    pub const fn for_severity(&self, severity: Severity) -> Duration {
        match severity {
            Severity::Success => self.success,
            Severity::Error => self.error,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }
}

impl Default for SeverityDurations {
    fn default() -> Self {
        Self {
            success: default_success(),
            error: default_error(),
            warning: default_warning(),
            info: default_info(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stagger_step: DEFAULT_STAGGER_STEP,
            hide_transition: DEFAULT_HIDE_TRANSITION,
            default_duration: DEFAULT_DURATION,
            durations: SeverityDurations::default(),
            allow_html: false,
        }
    }
}

impl Config {
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        let path = path.as_ref();
        builder = builder.add_source(::config::File::from(path).required(false));
        builder = builder.add_source(
            ::config::Environment::with_prefix("TOASTER")
                .separator("__")
                .try_parsing(true),
        );

        let mut raw: RawConfig = builder
            .build()
            .map_err(|err| ConfigError::Other(err.to_string()))?
            .try_deserialize()
            .map_err(|err| ConfigError::Parse(err.to_string()))?;

        raw.apply_env_overrides()?;
        raw.validate_and_build()
    }
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    timing: RawTiming,
    #[serde(default)]
    durations: RawDurations,
    #[serde(default)]
    render: RawRender,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct RawTiming {
    #[serde(default = "default_stagger_step")]
    #[serde_as(as = "HumantimeDuration")]
    stagger_step: Duration,
    #[serde(default = "default_hide_transition")]
    #[serde_as(as = "HumantimeDuration")]
    hide_transition: Duration,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct RawDurations {
    #[serde(default = "default_duration")]
    #[serde_as(as = "HumantimeDuration")]
    default: Duration,
    #[serde(default = "default_success")]
    #[serde_as(as = "HumantimeDuration")]
    success: Duration,
    #[serde(default = "default_error")]
    #[serde_as(as = "HumantimeDuration")]
    error: Duration,
    #[serde(default = "default_warning")]
    #[serde_as(as = "HumantimeDuration")]
    warning: Duration,
    #[serde(default = "default_info")]
    #[serde_as(as = "HumantimeDuration")]
    info: Duration,
}

#[derive(Debug, Default, Deserialize)]
struct RawRender {
    #[serde(default)]
    allow_html: bool,
}

impl Default for RawTiming {
    fn default() -> Self {
        Self {
            stagger_step: default_stagger_step(),
            hide_transition: default_hide_transition(),
        }
    }
}

impl Default for RawDurations {
    fn default() -> Self {
        Self {
            default: default_duration(),
            success: default_success(),
            error: default_error(),
            warning: default_warning(),
            info: default_info(),
        }
    }
}

impl RawConfig {
    fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(step) = env_duration("TOASTER_STAGGER_STEP")? {
            self.timing.stagger_step = step;
        }
        if let Some(hide) = env_duration("TOASTER_HIDE_TRANSITION")? {
            self.timing.hide_transition = hide;
        }
        if let Some(default) = env_duration("TOASTER_DEFAULT_DURATION")? {
            self.durations.default = default;
        }
        if let Some(allow_html) = env_bool("TOASTER_ALLOW_HTML")? {
            self.render.allow_html = allow_html;
        }
        Ok(())
    }

    fn validate_and_build(self) -> Result<Config> {
        if self.durations.default.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "durations.default",
                message: "default duration must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(Config {
            stagger_step: self.timing.stagger_step,
            hide_transition: self.timing.hide_transition,
            default_duration: self.durations.default,
            durations: SeverityDurations {
                success: self.durations.success,
                error: self.durations.error,
                warning: self.durations.warning,
                info: self.durations.info,
            },
            allow_html: self.render.allow_html,
        })
    }
}

struct HumantimeDuration;

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

fn env_string(key: &'static str) -> std::result::Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(ConfigError::Other(err.to_string())),
    }
}

fn env_bool(key: &'static str) -> std::result::Result<Option<bool>, ConfigError> {
    if let Some(value) = env_string(key)? {
        if value.trim().is_empty() {
            return Ok(None);
        }
        return value
            .trim()
            .parse::<bool>()
            .map(Some)
            .map_err(|err| ConfigError::InvalidField {
                field: key,
                message: err.to_string(),
            });
    }
    Ok(None)
}

fn env_duration(key: &'static str) -> std::result::Result<Option<Duration>, ConfigError> {
    if let Some(value) = env_string(key)? {
        if value.trim().is_empty() {
            return Ok(None);
        }
        return parse_duration(value.trim())
            .map(Some)
            .map_err(|err| ConfigError::InvalidField {
                field: key,
                message: err.to_string(),
            });
    }
    Ok(None)
}

const fn default_stagger_step() -> Duration {
    DEFAULT_STAGGER_STEP
}

const fn default_hide_transition() -> Duration {
    DEFAULT_HIDE_TRANSITION
}

const fn default_duration() -> Duration {
    DEFAULT_DURATION
}

const fn default_success() -> Duration {
    Duration::from_secs(3)
}

const fn default_error() -> Duration {
    Duration::from_secs(5)
}

const fn default_warning() -> Duration {
    Duration::from_secs(4)
}

const fn default_info() -> Duration {
    Duration::from_secs(3)
}

#[cfg(test)]
mod tests {
    use super::{Config, HumantimeDuration, RawConfig};
    use crate::types::Severity;
    use serde::Deserialize;
    use serde_with::serde_as;
    use std::time::Duration;

    #[test]
    fn humantime_duration_parses_strings() {
        #[serde_as]
        #[derive(Deserialize)]
        struct Sample {
            #[serde_as(as = "Option<HumantimeDuration>")]
            duration: Option<Duration>,
        }

        let sample: Sample = serde_json::from_str(r#"{"duration":"150ms"}"#).unwrap();
        assert_eq!(sample.duration, Some(Duration::from_millis(150)));
    }

    #[test]
    fn raw_sections_fall_back_to_defaults() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"durations":{"error":"8s"},"render":{"allow_html":true}}"#)
                .unwrap();
        let config = raw.validate_and_build().unwrap();
        assert_eq!(config.stagger_step, Duration::from_millis(150));
        assert_eq!(config.hide_transition, Duration::from_millis(450));
        assert_eq!(config.durations.for_severity(Severity::Error), Duration::from_secs(8));
        assert_eq!(config.durations.for_severity(Severity::Warning), Duration::from_secs(4));
        assert!(config.allow_html);
    }

    #[test]
    fn zero_default_duration_is_rejected() {
        let raw: RawConfig = serde_json::from_str(r#"{"durations":{"default":"0s"}}"#).unwrap();
        assert!(raw.validate_and_build().is_err());
    }

    #[test]
    fn defaults_match_severity_shortcuts() {
        let config = Config::default();
        assert_eq!(config.default_duration, Duration::from_secs(3));
        assert_eq!(config.durations.success, Duration::from_secs(3));
        assert_eq!(config.durations.error, Duration::from_secs(5));
        assert_eq!(config.durations.warning, Duration::from_secs(4));
        assert_eq!(config.durations.info, Duration::from_secs(3));
    }
}
