use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Notice(#[from] NoticeError),
    #[error("failed to read notice requests from {path}")]
    RequestsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid notice request on line {line}: {message}")]
    RequestParse { line: usize, message: String },
    #[error("no tokio runtime available: {0}")]
    Runtime(String),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

/// Rejections raised while validating a [`NoticeRequest`](crate::types::NoticeRequest).
///
/// Unknown severities and bad durations are coerced, not rejected, so the
/// message is the only thing that can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NoticeError {
    #[error("notification message must be a non-empty string")]
    InvalidMessage,
}
