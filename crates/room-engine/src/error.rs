//! Error types for room-engine operations.

use chrono::NaiveTime;
use thiserror::Error;

use crate::source::SourceKind;

#[derive(Error, Debug)]
pub enum EngineError {
    /// An upstream provider reported failure. No partial result is computed.
    #[error("Data unavailable: {feed} feed failed: {reason}")]
    SourceUnavailable { feed: SourceKind, reason: String },

    #[error("Invalid time window: end {end} is before start {start}")]
    InvalidWindow { start: NaiveTime, end: NaiveTime },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A single event record could not be normalized. The normalizer skips it.
    #[error("Malformed event record: {0}")]
    MalformedRecord(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
