//! Decoded logger lines
//!
//! A `LogLine` keeps the original payload text next to the typed sentence so
//! the cleaned capture can be written back out unchanged.

use crate::envelope::{format_offset, split_line};
use crate::sentences::{Rmc, Sentence, SentenceRegistry};
use crate::types::{LineError, Offset, Timestamp, UNKNOWN_CHANNEL};
use std::fmt;

/// One record of a logger capture
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    /// Elapsed time since logger power-on
    pub offset: Offset,
    /// Source tag: `A`, `B` or `I` for the logger itself
    pub channel: String,
    /// Payload text as captured
    pub payload: String,
    /// Typed sentence, absent for unknown identifiers
    pub sentence: Option<Sentence>,
    /// Absolute time, set by the timestamp reconstructor
    pub corrected: Option<Timestamp>,
}

/// Classification of a single input line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Sentence decoded
    Decoded(LogLine),
    /// Envelope is fine but the identifier is not registered; the line is kept
    Unknown(LogLine, LineError),
    /// Line is dropped
    Rejected { channel: String, error: LineError },
}

impl LogLine {
    /// Split and decode one line of a capture
    pub fn parse(line: &str, registry: &SentenceRegistry) -> LineOutcome {
        let raw = match split_line(line) {
            Ok(raw) => raw,
            Err(error) => {
                return LineOutcome::Rejected {
                    channel: UNKNOWN_CHANNEL.to_string(),
                    error,
                }
            }
        };

        let mut log_line = LogLine {
            offset: raw.offset,
            channel: raw.channel.trim().to_string(),
            payload: raw.payload.trim().to_string(),
            sentence: None,
            corrected: None,
        };

        match registry.classify(&log_line.payload) {
            Ok(sentence) => {
                log_line.sentence = Some(sentence);
                LineOutcome::Decoded(log_line)
            }
            Err(error) if error.is_warning() => LineOutcome::Unknown(log_line, error),
            Err(error) => LineOutcome::Rejected {
                channel: log_line.channel,
                error,
            },
        }
    }

    /// The position fix carried by this line, if it is valid
    pub fn valid_fix(&self) -> Option<(&Rmc, Timestamp)> {
        match &self.sentence {
            Some(Sentence::Rmc(rmc)) => rmc.valid_fix_time().map(|time| (rmc, time)),
            _ => None,
        }
    }

    /// Line in capture format, `HH:MM:SS.mmm;<channel>;<payload>`
    pub fn to_capture_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{}",
            format_offset(self.offset),
            self.channel,
            self.payload
        )
    }
}
