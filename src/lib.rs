#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod error;
pub mod notifier;
pub mod render;
pub mod scheduler;
pub mod store;
pub mod telemetry;
pub mod types;

pub use notifier::{NoticeSnapshot, Notifier};
pub use types::{NoticeId, NoticeRequest, NoticeStatus, Severity};

pub type Result<T> = std::result::Result<T, error::Error>;
