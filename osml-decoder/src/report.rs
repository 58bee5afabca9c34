//! Check report model
//!
//! `FileResult` collects what was learned about one capture, `CheckResult`
//! aggregates a batch. Both serialise to the `report.json` layout.

use crate::types::{Timestamp, INTERNAL_CHANNEL};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// An error or warning tagged with the channel it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Issue {
    pub channel: String,
    pub message: String,
}

impl Issue {
    pub fn new(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// File-level note on the internal channel
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_CHANNEL, message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.channel, self.message)
    }
}

impl From<Issue> for String {
    fn from(issue: Issue) -> Self {
        issue.to_string()
    }
}

/// Outcome of analysing one capture file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    /// Name of the cleaned output file
    pub filename: String,
    /// Path of the analysed capture
    pub origin: String,
    pub created: Option<Timestamp>,
    #[serde(rename = "vesselID")]
    pub vessel_id: i64,
    /// Number of retained lines
    pub datagram_count: usize,
    /// Firmware version from the start marker
    pub version: String,
    pub first_timestamp: Option<Timestamp>,
    pub last_timestamp: Option<Timestamp>,
    error_count: usize,
    errors: Vec<Issue>,
    warning_count: usize,
    warnings: Vec<Issue>,
}

impl FileResult {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    pub fn add_error(&mut self, issue: Issue) {
        self.errors.push(issue);
        self.error_count = self.errors.len();
    }

    pub fn add_warning(&mut self, issue: Issue) {
        self.warnings.push(issue);
        self.warning_count = self.warnings.len();
    }

    pub fn errors(&self) -> &[Issue] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Issue] {
        &self.warnings
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Errors raised on one channel
    pub fn errors_on<'a>(&'a self, channel: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.errors.iter().filter(move |e| e.channel == channel)
    }
}

/// Aggregate over a batch of files
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub created: Timestamp,
    /// Keyed by origin file name
    pub files: BTreeMap<String, FileResult>,
}

impl Default for CheckResult {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckResult {
    pub fn new() -> Self {
        Self {
            created: Utc::now(),
            files: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, result: FileResult) {
        self.files.insert(name.into(), result);
    }

    pub fn error_count(&self) -> usize {
        self.files.values().map(FileResult::error_count).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.files.values().map(FileResult::warning_count).sum()
    }

    /// Pretty-printed `report.json`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    created: &'a Timestamp,
    error_count: usize,
    warning_count: usize,
    files: &'a BTreeMap<String, FileResult>,
}

impl Serialize for CheckResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Report {
            created: &self.created,
            error_count: self.error_count(),
            warning_count: self.warning_count(),
            files: &self.files,
        }
        .serialize(serializer)
    }
}
