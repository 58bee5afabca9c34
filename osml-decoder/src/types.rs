//! Core types for the logger decoder library
//!
//! This module defines the timestamp and duration types used across the
//! pipeline together with the two error families: file/batch level failures
//! (`DecoderError`) and per-line classification (`LineError`).

use chrono::{DateTime, TimeDelta, Utc};
use std::path::PathBuf;

/// Absolute timestamp type used throughout the decoder
pub type Timestamp = DateTime<Utc>;

/// Elapsed time since logger power-on, as recorded per line
pub type Offset = TimeDelta;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Channel tag used for file-level notes
pub const INTERNAL_CHANNEL: &str = "I";

/// Channel tag used when a line is too broken to carry one
pub const UNKNOWN_CHANNEL: &str = "?";

/// The zero instant reconstruction falls back to when no fix anchors a file
pub fn zero_instant() -> Timestamp {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Errors that abort a file or a batch
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SD card folder does not exist: {0:?}")]
    WrongCardFolder(PathBuf),

    #[error("The output file already exists: {0:?}")]
    OutputAlreadyExists(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to write report: {0}")]
    Report(String),
}

impl From<serde_json::Error> for DecoderError {
    fn from(e: serde_json::Error) -> Self {
        DecoderError::Report(e.to_string())
    }
}

/// Per-line classification of decode failures
///
/// Only `UnknownTag` is a warning; the line it belongs to is kept. Every other
/// variant drops the line and counts as an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("malformed line: expected <offset>;<channel>;<payload>")]
    MalformedLine,

    #[error("invalid time offset: {0}")]
    InvalidOffset(String),

    #[error("not a NMEA sentence")]
    NotNmea,

    #[error("unknown NMEA tag: {0}")]
    UnknownTag(String),

    #[error("failed to decode {ident}: {reason}")]
    Decode { ident: String, reason: String },
}

impl LineError {
    /// True if the line should be kept and the issue counted as a warning
    pub fn is_warning(&self) -> bool {
        matches!(self, LineError::UnknownTag(_))
    }
}
