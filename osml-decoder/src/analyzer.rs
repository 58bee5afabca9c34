//! Per-file analysis
//!
//! Drives one capture through line decoding, ordering and timestamp
//! reconstruction, and fills a `FileResult` along the way. Writing the
//! cleaned capture is a separate step so that analysis stays free of side
//! effects.

use crate::logline::{LineOutcome, LogLine};
use crate::report::{FileResult, Issue};
use crate::sentences::SentenceRegistry;
use crate::timestamp::TimestampReconstructor;
use crate::types::{zero_instant, DecoderError, Result, Timestamp};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File note when no line survived decoding
pub const NO_VALID_LINES: &str = "no valid lines found";

/// File note when no valid fix anchors the reconstruction
pub const NO_REFERENCE_TIME: &str = "no reference time found";

/// Output of analysing one capture
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub result: FileResult,
    /// Retained lines in offset order, with corrected times
    pub lines: Vec<LogLine>,
    pub reference_found: bool,
}

impl FileAnalysis {
    /// True if the capture yielded nothing worth writing
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Analyses capture files with a shared sentence registry
#[derive(Debug, Clone, Default)]
pub struct FileAnalyzer {
    registry: SentenceRegistry,
}

impl FileAnalyzer {
    /// Analyzer with the full sentence registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with a custom registry
    pub fn with_registry(registry: SentenceRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SentenceRegistry {
        &self.registry
    }

    /// Analyse a capture file
    pub fn analyze_file(&self, path: &Path) -> Result<FileAnalysis> {
        log::info!("Analysing {:?}", path);
        let file = File::open(path)?;
        self.analyze_reader(&path.to_string_lossy(), BufReader::new(file))
    }

    /// Analyse a capture from any buffered reader
    ///
    /// `origin` names the capture in the report and in the output file name.
    pub fn analyze_reader<R: BufRead>(&self, origin: &str, mut reader: R) -> Result<FileAnalysis> {
        let mut result = FileResult::new(origin);
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        let mut number = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            number += 1;

            let text = String::from_utf8_lossy(&buf);
            if text.trim().is_empty() {
                continue;
            }

            match LogLine::parse(&text, &self.registry) {
                LineOutcome::Decoded(line) => lines.push(line),
                LineOutcome::Unknown(line, error) => {
                    log::debug!("Warning in line {}: {}: {}", number, text.trim_end(), error);
                    result.add_warning(Issue::new(
                        line.channel.clone(),
                        format!("line {}: {}", number, error),
                    ));
                    lines.push(line);
                }
                LineOutcome::Rejected { channel, error } => {
                    log::warn!("Error in line {}: {}: {}", number, text.trim_end(), error);
                    result.add_error(Issue::new(channel, format!("line {}: {}", number, error)));
                }
            }
        }

        if lines.is_empty() {
            log::warn!("{}: {}", origin, NO_VALID_LINES);
            result.add_error(Issue::internal(NO_VALID_LINES));
            return Ok(FileAnalysis {
                result,
                lines,
                reference_found: false,
            });
        }

        lines.sort_by_key(|line| line.offset);
        let reconstruction = TimestampReconstructor::reconstruct(&mut lines);

        if !reconstruction.reference_found {
            log::info!("{}: {}", origin, NO_REFERENCE_TIME);
            result.add_warning(Issue::internal(NO_REFERENCE_TIME));
        }

        result.created = reconstruction.created;
        result.vessel_id = reconstruction.vessel_id.unwrap_or(0);
        result.version = reconstruction.version.unwrap_or_default();
        result.datagram_count = lines.len();
        result.first_timestamp = lines.first().and_then(|l| l.corrected);
        result.last_timestamp = lines.last().and_then(|l| l.corrected);
        result.filename = output_filename(result.vessel_id, origin, result.created);

        log::info!(
            "{}: {} lines, {} errors, {} warnings",
            origin,
            lines.len(),
            result.error_count(),
            result.warning_count()
        );

        Ok(FileAnalysis {
            result,
            lines,
            reference_found: reconstruction.reference_found,
        })
    }
}

/// `<vessel>-<base name>-<YYYY-MM-DD>.nmea`
///
/// Captures without a valid fix are dated by the zero instant.
pub fn output_filename(vessel_id: i64, origin: &str, created: Option<Timestamp>) -> String {
    let stem = Path::new(origin)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let date = created.unwrap_or_else(zero_instant).format("%Y-%m-%d");
    format!("{}-{}-{}.nmea", vessel_id, stem, date)
}

/// Write the cleaned capture into `dir`
///
/// Fails with `OutputAlreadyExists` unless `overwrite` is set.
pub fn write_output(analysis: &FileAnalysis, dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let path = dir.join(&analysis.result.filename);
    if path.exists() && !overwrite {
        return Err(DecoderError::OutputAlreadyExists(path));
    }

    fs::create_dir_all(dir)?;
    let mut writer = BufWriter::new(File::create(&path)?);
    for line in &analysis.lines {
        write!(writer, "{}\r\n", line)?;
    }
    writer.flush()?;

    log::info!("Writing cleaned capture to {:?}", path);
    Ok(path)
}
