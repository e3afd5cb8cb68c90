//! Values that flow through the run pipeline.
//!
//! The controller treats [`CheckSnapshot`] and [`DiagnosticCollection`] as opaque:
//! parsers produce them, views and sinks consume them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Coarse phase of a model checking run as reported by the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckPhase {
    #[default]
    NotStarted,
    Starting,
    SanyParsing,
    ComputingInit,
    Checking,
    CheckingLiveness,
    Finished,
}

/// Overall verdict once the run has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckVerdict {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressStats {
    pub diameter: Option<u64>,
    pub generated: u64,
    pub distinct: u64,
    pub left: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageItem {
    pub module: String,
    pub action: String,
    pub range: Range,
    pub distinct: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedError {
    pub code: u32,
    pub message: String,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub module: String,
    pub range: Range,
}

/// Incremental view of a run, replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CheckSnapshot {
    pub phase: CheckPhase,
    pub verdict: Option<CheckVerdict>,
    pub model_file: PathBuf,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub mode: Option<String>,
    pub progress: Vec<ProgressStats>,
    pub coverage: Vec<CoverageItem>,
    pub errors: Vec<ReportedError>,
    pub warnings: Vec<String>,
    pub output_lines: Vec<String>,
}

impl CheckSnapshot {
    pub fn new(model_file: &Path) -> Self {
        Self {
            model_file: model_file.to_path_buf(),
            ..Self::default()
        }
    }
}

/// Zero-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Builds a range from the one-based `line, col` pairs used in tool output.
    pub fn from_one_based(line: u32, col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start: Position {
                line: line.saturating_sub(1),
                column: col.saturating_sub(1),
            },
            end: Position {
                line: end_line.saturating_sub(1),
                column: end_col,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Information,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: Severity,
    pub message: String,
}

/// Final diagnostics of a run keyed by source file.
///
/// Files present with an empty list mean "clear what was reported before".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct DiagnosticCollection {
    files: BTreeMap<PathBuf, Vec<Diagnostic>>,
}

impl DiagnosticCollection {
    /// Creates a collection that always reports `file`, even if nothing is added.
    pub fn for_file(file: &Path) -> Self {
        let mut files = BTreeMap::new();
        files.insert(file.to_path_buf(), Vec::new());
        Self { files }
    }

    pub fn add(&mut self, file: PathBuf, diagnostic: Diagnostic) {
        self.files.entry(file).or_default().push(diagnostic);
    }

    pub fn files(&self) -> impl Iterator<Item = (&Path, &[Diagnostic])> {
        self.files.iter().map(|(p, d)| (p.as_path(), d.as_slice()))
    }

    pub fn get(&self, file: &Path) -> Option<&[Diagnostic]> {
        self.files.get(file).map(Vec::as_slice)
    }

    pub fn total(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}
