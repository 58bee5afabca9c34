//! OSML Logger Decoder Library
//!
//! A stateless, reusable library for decoding the dump files of an NMEA data
//! logger and reconstructing absolute timestamps for every recorded line.
//!
//! # Architecture
//!
//! The logger writes one record per line, `HH:MM:SS.mmm;<channel>;<payload>`,
//! where the offset is time since power-on. Decoding is a pipeline:
//! - `envelope` splits a record into offset, channel and payload
//! - `sentences` frames the payload, checks the checksum and dispatches to a
//!   typed decoder through an explicitly constructed `SentenceRegistry`
//! - `timestamp` anchors the elapsed offsets on valid position fixes
//! - `analyzer` and `check` drive files and batches and build the report
//! - `waypoints` folds the corrected lines into a track
//!
//! The library does NOT:
//! - Export GPX/KML/GeoJSON files
//! - Back up, format or label storage cards
//! - Parse command lines or configuration files
//!
//! All of that lives in the application layer (osml-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use osml_decoder::{extract_track, CheckConfig, Checker, FileAnalyzer};
//! use std::path::Path;
//!
//! // Check a whole storage card
//! let config = CheckConfig::new()
//!     .with_output_dir("cleaned")
//!     .with_report(true);
//! let result = Checker::new(config).check(Path::new("/media/sdcard")).unwrap();
//! println!("{} errors, {} warnings", result.error_count(), result.warning_count());
//!
//! // Or analyse one capture and build its track
//! let analysis = FileAnalyzer::new()
//!     .analyze_file(Path::new("/media/sdcard/DATA0001.DAT"))
//!     .unwrap();
//! let track = extract_track("DATA0001", &analysis.lines);
//! println!("{} waypoints", track.waypoints.len());
//! ```

// Public modules
pub mod analyzer;
pub mod check;
pub mod config;
pub mod envelope;
pub mod logger_config;
pub mod logline;
pub mod report;
pub mod sentences;
pub mod timestamp;
pub mod types;
pub mod waypoints;

// Re-export main types for convenience
pub use analyzer::{output_filename, write_output, FileAnalysis, FileAnalyzer};
pub use check::Checker;
pub use config::CheckConfig;
pub use envelope::{format_offset, parse_offset, split_line, RawLine};
pub use logger_config::{baud_from_code, code_from_baud, LoggerConfig};
pub use logline::{LineOutcome, LogLine};
pub use report::{CheckResult, FileResult, Issue};
pub use sentences::{Sentence, SentenceError, SentenceRegistry};
pub use timestamp::{Reconstruction, TimestampReconstructor};
pub use types::{DecoderError, LineError, Offset, Result, Timestamp};
pub use waypoints::{extract_track, merge_lines, Track, Waypoint};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: the default analyzer knows every logger sentence
        let analyzer = FileAnalyzer::new();
        assert_eq!(analyzer.registry().len(), 13);
        assert!(!VERSION.is_empty());
    }
}
