//! Batch checker
//!
//! Analyses every data file of a storage card (or a single capture), writes
//! the cleaned captures and aggregates a `CheckResult`. Files are analysed in
//! parallel; writing and aggregation happen afterwards in file name order.

use crate::analyzer::{write_output, FileAnalysis, FileAnalyzer};
use crate::config::CheckConfig;
use crate::report::{CheckResult, FileResult, Issue};
use crate::types::{DecoderError, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Runs the analyzer over a batch of captures
#[derive(Debug, Clone, Default)]
pub struct Checker {
    analyzer: FileAnalyzer,
    config: CheckConfig,
}

impl Checker {
    pub fn new(config: CheckConfig) -> Self {
        Self {
            analyzer: FileAnalyzer::new(),
            config,
        }
    }

    /// Checker with a custom analyzer
    pub fn with_analyzer(mut self, analyzer: FileAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Data files of a card folder, or the file itself
    pub fn data_files(&self, source: &Path) -> Result<Vec<PathBuf>> {
        if !source.exists() {
            return Err(DecoderError::WrongCardFolder(source.to_path_buf()));
        }
        if source.is_file() {
            return Ok(vec![source.to_path_buf()]);
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(source)? {
            let path = entry?.path();
            if path.is_file() && self.config.is_data_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Check a card folder or a single capture
    pub fn check(&self, source: &Path) -> Result<CheckResult> {
        log::info!(
            "Check called: source {:?}, output {:?}",
            source,
            self.config.output_dir
        );

        let files = self.data_files(source)?;
        log::info!("Found {} data files", files.len());
        fs::create_dir_all(&self.config.output_dir)?;

        let analyses: Vec<(PathBuf, Result<FileAnalysis>)> = files
            .par_iter()
            .map(|path| (path.clone(), self.analyzer.analyze_file(path)))
            .collect();

        let mut check = CheckResult::new();
        let mut written = HashSet::new();
        for (path, analysis) in analyses {
            let result = self.finish_file(&path, analysis, &mut written);
            log::info!(
                "File {:?} parsed with {} errors and {} warnings",
                path,
                result.error_count(),
                result.warning_count()
            );
            check.insert(file_key(&path), result);
        }

        log::info!(
            "All files parsed with {} errors and {} warnings",
            check.error_count(),
            check.warning_count()
        );

        if self.config.write_report {
            let report = self.config.report_path();
            fs::write(&report, check.to_json()?)?;
            log::info!("Report written to {:?}", report);
        }

        Ok(check)
    }

    /// Write one output and fold its failures into the file result
    ///
    /// `written` holds the output names of this run; a repeated name is an
    /// error even when overwriting is allowed.
    fn finish_file(
        &self,
        path: &Path,
        analysis: Result<FileAnalysis>,
        written: &mut HashSet<String>,
    ) -> FileResult {
        let analysis = match analysis {
            Ok(analysis) => analysis,
            Err(e) => {
                log::error!("Failed to analyse {:?}: {}", path, e);
                let mut result = FileResult::new(path.to_string_lossy());
                result.add_error(Issue::internal(e.to_string()));
                return result;
            }
        };

        if analysis.is_empty() {
            return analysis.result;
        }

        let filename = &analysis.result.filename;
        let outcome = if written.insert(filename.clone()) {
            write_output(&analysis, &self.config.output_dir, self.config.overwrite)
        } else {
            Err(DecoderError::OutputAlreadyExists(
                self.config.output_dir.join(filename),
            ))
        };

        match outcome {
            Ok(_) => analysis.result,
            Err(e) => {
                log::error!("Failed to write output for {:?}: {}", path, e);
                let mut result = analysis.result;
                result.add_error(Issue::internal(e.to_string()));
                result
            }
        }
    }
}

fn file_key(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
