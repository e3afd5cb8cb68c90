//! Turns TLC `-tool` output into snapshots and final diagnostics.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tokio::io::{AsyncBufReadExt, BufReader};

use tlcrun_core::api::{
    CheckPhase, CheckSnapshot, CheckVerdict, CoverageItem, Diagnostic, DiagnosticCollection,
    OutputParser, ProcessOutput, ProgressStats, Range, ReportedError, Severity, SourceLocation,
};

use super::framing::{classify, Frame, SEVERITY_ERROR, SEVERITY_TLC_BUG, SEVERITY_WARNING};

pub const DEFAULT_MAX_OUTPUT_LINES: usize = 200;

pub mod codes {
    pub const TLC_BEHAVIOR_UP_TO_THIS_POINT: u32 = 2121;
    pub const TLC_STARTING: u32 = 2185;
    pub const TLC_FINISHED: u32 = 2186;
    pub const TLC_MODE_MC: u32 = 2187;
    pub const TLC_COMPUTING_INIT: u32 = 2189;
    pub const TLC_INIT_GENERATED: u32 = 2190;
    pub const TLC_CHECKING_TEMPORAL_PROPS: u32 = 2192;
    pub const TLC_SUCCESS: u32 = 2193;
    pub const TLC_STATS: u32 = 2199;
    pub const TLC_PROGRESS_STATS: u32 = 2200;
    pub const TLC_COVERAGE_START: u32 = 2201;
    pub const TLC_COVERAGE_END: u32 = 2202;
    pub const TLC_SANY_END: u32 = 2219;
    pub const TLC_SANY_START: u32 = 2220;
    pub const TLC_VERSION: u32 = 2262;
}

lazy_static! {
    static ref STATS_RE: Regex = Regex::new(
        r"(?:Progress\((\d+)\).*?: )?([\d,]+) states generated.*?([\d,]+) distinct states found.*?([\d,]+) states? left on queue"
    )
    .unwrap();
    static ref COVERAGE_RE: Regex = Regex::new(
        r"^\s*<(\w+) line (\d+), col (\d+) to line (\d+), col (\d+) of module (\w+)>: (\d+):(\d+)"
    )
    .unwrap();
    static ref LOCATION_RE: Regex =
        Regex::new(r"line (\d+), col(?:umn)? (\d+) to line (\d+), col(?:umn)? (\d+) of module (\w+)")
            .unwrap();
    static ref STARTED_RE: Regex =
        Regex::new(r"\((\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\)").unwrap();
}

/// Reads TLC tool-mode output to the end.
#[derive(Debug, Clone)]
pub struct TlcToolOutputParser {
    max_output_lines: usize,
}

impl Default for TlcToolOutputParser {
    fn default() -> Self {
        Self {
            max_output_lines: DEFAULT_MAX_OUTPUT_LINES,
        }
    }
}

impl TlcToolOutputParser {
    pub fn with_max_output_lines(max_output_lines: usize) -> Self {
        Self { max_output_lines }
    }
}

#[async_trait]
impl OutputParser for TlcToolOutputParser {
    async fn read_all(
        &self,
        output: ProcessOutput,
        file: &Path,
        on_snapshot: &mut (dyn FnMut(CheckSnapshot) + Send),
    ) -> Result<DiagnosticCollection> {
        let mut reader = BufReader::new(output);
        let mut state = TlcOutputState::new(file, self.max_output_lines);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .await
                .context("reading TLC output")?;
            if n == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if let Some(snapshot) = state.push_line(&line) {
                on_snapshot(snapshot);
            }
        }
        if let Some(snapshot) = state.flush() {
            on_snapshot(snapshot);
        }
        tracing::debug!(
            target: "tlcrun.parser",
            messages = state.messages_seen,
            errors = state.snapshot.errors.len(),
            "TLC output ended"
        );
        Ok(state.into_diagnostics())
    }
}

struct OpenMessage {
    code: u32,
    severity: u32,
    lines: Vec<String>,
}

/// Incremental state for one run. Feed lines, get a snapshot per completed message.
pub struct TlcOutputState {
    snapshot: CheckSnapshot,
    spec_file: PathBuf,
    open: Vec<OpenMessage>,
    output: VecDeque<String>,
    max_output_lines: usize,
    messages_seen: usize,
}

impl TlcOutputState {
    pub fn new(spec_file: &Path, max_output_lines: usize) -> Self {
        Self {
            snapshot: CheckSnapshot::new(spec_file),
            spec_file: spec_file.to_path_buf(),
            open: Vec::new(),
            output: VecDeque::new(),
            max_output_lines,
            messages_seen: 0,
        }
    }

    pub fn snapshot(&self) -> &CheckSnapshot {
        &self.snapshot
    }

    pub fn push_line(&mut self, line: &str) -> Option<CheckSnapshot> {
        match classify(line) {
            Frame::Start { code, severity } => {
                self.open.push(OpenMessage {
                    code,
                    severity,
                    lines: Vec::new(),
                });
                None
            }
            Frame::End { code } => {
                let msg = self.open.pop()?;
                if msg.code != code {
                    tracing::debug!(
                        target: "tlcrun.parser",
                        open = msg.code,
                        closed = code,
                        "mismatched message end"
                    );
                }
                self.apply(msg);
                Some(self.snapshot.clone())
            }
            Frame::Text(text) => {
                match self.open.last_mut() {
                    Some(msg) => msg.lines.push(text.to_string()),
                    None => self.push_output(text),
                }
                None
            }
        }
    }

    /// Applies messages cut off by the end of the stream.
    pub fn flush(&mut self) -> Option<CheckSnapshot> {
        if self.open.is_empty() {
            return None;
        }
        while let Some(msg) = self.open.pop() {
            self.apply(msg);
        }
        Some(self.snapshot.clone())
    }

    pub fn into_diagnostics(self) -> DiagnosticCollection {
        let mut collection = DiagnosticCollection::for_file(&self.spec_file);
        let dir = self
            .spec_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        for err in &self.snapshot.errors {
            let (file, range) = match &err.location {
                Some(loc) => (dir.join(format!("{}.tla", loc.module)), loc.range),
                None => (self.spec_file.clone(), Range::default()),
            };
            collection.add(
                file,
                Diagnostic {
                    range,
                    severity: Severity::Error,
                    message: err.message.clone(),
                },
            );
        }
        collection
    }

    fn push_output(&mut self, text: &str) {
        if self.max_output_lines == 0 {
            return;
        }
        if self.output.len() == self.max_output_lines {
            self.output.pop_front();
        }
        self.output.push_back(text.to_string());
        self.snapshot.output_lines = self.output.iter().cloned().collect();
    }

    fn apply(&mut self, msg: OpenMessage) {
        use codes::*;

        self.messages_seen += 1;
        let text = msg.lines.join("\n");
        let s = &mut self.snapshot;

        match msg.severity {
            SEVERITY_ERROR | SEVERITY_TLC_BUG if msg.code == TLC_BEHAVIOR_UP_TO_THIS_POINT => {
                // Trace header that belongs to the violation reported just before it.
                match s.errors.last_mut() {
                    Some(prev) => {
                        prev.message.push('\n');
                        prev.message.push_str(text.trim());
                    }
                    None => tracing::debug!(
                        target: "tlcrun.parser",
                        "behavior trace header without a preceding error"
                    ),
                }
                s.verdict = Some(CheckVerdict::Error);
                return;
            }
            SEVERITY_ERROR | SEVERITY_TLC_BUG => {
                s.errors.push(ReportedError {
                    code: msg.code,
                    message: text.trim().to_string(),
                    location: find_location(&text),
                });
                s.verdict = Some(CheckVerdict::Error);
                return;
            }
            SEVERITY_WARNING => {
                s.warnings.push(text.trim().to_string());
                return;
            }
            _ => {}
        }

        match msg.code {
            TLC_SANY_START => s.phase = CheckPhase::SanyParsing,
            TLC_SANY_END => {}
            TLC_STARTING => {
                s.phase = CheckPhase::Starting;
                s.started_at = Some(parse_started_at(&text).unwrap_or_else(Utc::now));
            }
            TLC_MODE_MC => s.mode = Some(text.trim().to_string()),
            TLC_VERSION => {
                tracing::debug!(target: "tlcrun.parser", version = %text.trim(), "TLC version");
            }
            TLC_COMPUTING_INIT => s.phase = CheckPhase::ComputingInit,
            TLC_INIT_GENERATED => s.phase = CheckPhase::Checking,
            TLC_CHECKING_TEMPORAL_PROPS => s.phase = CheckPhase::CheckingLiveness,
            TLC_PROGRESS_STATS | TLC_STATS => {
                if let Some(stats) = parse_stats(&text) {
                    s.progress.push(stats);
                }
            }
            TLC_COVERAGE_START => s.coverage.clear(),
            TLC_COVERAGE_END => {}
            TLC_SUCCESS => {
                if s.verdict.is_none() {
                    s.verdict = Some(CheckVerdict::Success);
                }
            }
            TLC_FINISHED => {
                s.phase = CheckPhase::Finished;
                s.finished_at = Some(Utc::now());
            }
            _ => {}
        }

        // Coverage values arrive as their own messages on newer TLC releases.
        for line in &msg.lines {
            if let Some(item) = parse_coverage(line) {
                s.coverage.push(item);
            }
        }
    }
}

fn number(c: &Captures<'_>, i: usize) -> Option<u64> {
    c.get(i)?.as_str().replace(',', "").parse().ok()
}

fn small(c: &Captures<'_>, i: usize) -> Option<u32> {
    c.get(i)?.as_str().parse().ok()
}

pub fn parse_stats(text: &str) -> Option<ProgressStats> {
    let c = STATS_RE.captures(text)?;
    Some(ProgressStats {
        diameter: number(&c, 1),
        generated: number(&c, 2)?,
        distinct: number(&c, 3)?,
        left: number(&c, 4)?,
    })
}

pub fn parse_coverage(line: &str) -> Option<CoverageItem> {
    let c = COVERAGE_RE.captures(line)?;
    Some(CoverageItem {
        action: c[1].to_string(),
        range: Range::from_one_based(small(&c, 2)?, small(&c, 3)?, small(&c, 4)?, small(&c, 5)?),
        module: c[6].to_string(),
        distinct: number(&c, 7)?,
        total: number(&c, 8)?,
    })
}

pub fn find_location(text: &str) -> Option<SourceLocation> {
    let c = LOCATION_RE.captures(text)?;
    Some(SourceLocation {
        range: Range::from_one_based(small(&c, 1)?, small(&c, 2)?, small(&c, 3)?, small(&c, 4)?),
        module: c[5].to_string(),
    })
}

fn parse_started_at(text: &str) -> Option<chrono::DateTime<Utc>> {
    let c = STARTED_RE.captures(text)?;
    let naive = NaiveDateTime::parse_from_str(&c[1], "%Y-%m-%d %H:%M:%S").ok()?;
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tlcrun_core::api::Position;

    fn feed(state: &mut TlcOutputState, lines: &[&str]) -> Vec<CheckSnapshot> {
        lines.iter().filter_map(|l| state.push_line(l)).collect()
    }

    #[test]
    fn progress_lines_with_and_without_depth() {
        let p = parse_stats(
            "Progress(7) at 2024-01-02 10:11:12: 1,234 states generated (1,234 s/min), 567 distinct states found (567 ds/min), 8 states left on queue.",
        )
        .unwrap();
        assert_eq!(
            p,
            ProgressStats {
                diameter: Some(7),
                generated: 1234,
                distinct: 567,
                left: 8
            }
        );

        let p = parse_stats(
            "6 states generated, 6 distinct states found, 0 states left on queue.",
        )
        .unwrap();
        assert_eq!(p.diameter, None);
        assert_eq!((p.generated, p.distinct, p.left), (6, 6, 0));
    }

    #[test]
    fn coverage_item_is_parsed() {
        let item =
            parse_coverage("<Next line 12, col 1 to line 15, col 20 of module Queue>: 4:10").unwrap();
        assert_eq!(item.module, "Queue");
        assert_eq!(item.action, "Next");
        assert_eq!(item.range.start, Position { line: 11, column: 0 });
        assert_eq!((item.distinct, item.total), (4, 10));
    }

    #[test]
    fn one_snapshot_per_completed_message() {
        let mut state = TlcOutputState::new(Path::new("/specs/Queue.tla"), 10);
        let snaps = feed(
            &mut state,
            &[
                "@!@!@STARTMSG 2262:0 @!@!@",
                "TLC2 Version 2.18",
                "@!@!@ENDMSG 2262 @!@!@",
                "@!@!@STARTMSG 2185:0 @!@!@",
                "Starting... (2024-01-02 10:11:12)",
                "@!@!@ENDMSG 2185 @!@!@",
                "@!@!@STARTMSG 2189:0 @!@!@",
                "Computing initial states...",
                "@!@!@ENDMSG 2189 @!@!@",
                "@!@!@STARTMSG 2190:0 @!@!@",
                "Finished computing initial states: 1 distinct state generated.",
                "@!@!@ENDMSG 2190 @!@!@",
            ],
        );
        assert_eq!(snaps.len(), 4);
        assert_eq!(snaps[1].phase, CheckPhase::Starting);
        assert!(snaps[1].started_at.is_some());
        assert_eq!(snaps[2].phase, CheckPhase::ComputingInit);
        assert_eq!(snaps[3].phase, CheckPhase::Checking);
    }

    #[test]
    fn errors_become_diagnostics_in_their_module() {
        let mut state = TlcOutputState::new(Path::new("/specs/Queue.tla"), 10);
        feed(
            &mut state,
            &[
                "@!@!@STARTMSG 2110:1 @!@!@",
                "Invariant TypeOK is violated.",
                "@!@!@ENDMSG 2110 @!@!@",
                "@!@!@STARTMSG 1000:1 @!@!@",
                "Error: unknown operator in line 4, col 9 to line 4, col 13 of module Buffer",
                "@!@!@ENDMSG 1000 @!@!@",
            ],
        );
        assert_eq!(state.snapshot().verdict, Some(CheckVerdict::Error));

        let diags = state.into_diagnostics();
        assert_eq!(diags.total(), 2);
        let spec = diags.get(Path::new("/specs/Queue.tla")).unwrap();
        assert_eq!(spec[0].range, Range::default());
        assert_eq!(spec[0].message, "Invariant TypeOK is violated.");
        let buffer = diags.get(Path::new("/specs/Buffer.tla")).unwrap();
        assert_eq!(buffer[0].range, Range::from_one_based(4, 9, 4, 13));
    }

    #[test]
    fn behavior_header_joins_the_preceding_violation() {
        let mut state = TlcOutputState::new(Path::new("/specs/Queue.tla"), 10);
        feed(
            &mut state,
            &[
                "@!@!@STARTMSG 2110:1 @!@!@",
                "Invariant TypeOK is violated.",
                "@!@!@ENDMSG 2110 @!@!@",
                "@!@!@STARTMSG 2121:1 @!@!@",
                "The behavior up to this point is:",
                "@!@!@ENDMSG 2121 @!@!@",
            ],
        );
        let snap = state.snapshot();
        assert_eq!(snap.errors.len(), 1);
        assert_eq!(snap.errors[0].code, 2110);
        assert_eq!(
            snap.errors[0].message,
            "Invariant TypeOK is violated.\nThe behavior up to this point is:"
        );

        let diags = state.into_diagnostics();
        assert_eq!(diags.total(), 1);
        let spec = diags.get(Path::new("/specs/Queue.tla")).unwrap();
        assert!(spec[0].message.starts_with("Invariant TypeOK is violated."));
    }

    #[test]
    fn success_keeps_spec_file_with_no_diagnostics() {
        let mut state = TlcOutputState::new(Path::new("/specs/Queue.tla"), 10);
        feed(
            &mut state,
            &[
                "@!@!@STARTMSG 2193:0 @!@!@",
                "Model checking completed. No error has been found.",
                "@!@!@ENDMSG 2193 @!@!@",
                "@!@!@STARTMSG 2186:0 @!@!@",
                "Finished in 01s at (2024-01-02 10:11:13)",
                "@!@!@ENDMSG 2186 @!@!@",
            ],
        );
        assert_eq!(state.snapshot().verdict, Some(CheckVerdict::Success));
        assert_eq!(state.snapshot().phase, CheckPhase::Finished);
        let diags = state.into_diagnostics();
        assert_eq!(diags.total(), 0);
        assert!(diags.get(Path::new("/specs/Queue.tla")).is_some());
    }

    #[test]
    fn unframed_output_is_bounded() {
        let mut state = TlcOutputState::new(Path::new("/specs/Queue.tla"), 2);
        assert!(feed(&mut state, &["a", "b", "c"]).is_empty());
        assert_eq!(state.snapshot().output_lines, vec!["b", "c"]);
    }

    #[test]
    fn truncated_message_is_flushed() {
        let mut state = TlcOutputState::new(Path::new("/specs/Queue.tla"), 10);
        feed(&mut state, &["@!@!@STARTMSG 2103:1 @!@!@", "Deadlock reached."]);
        let snap = state.flush().unwrap();
        assert_eq!(snap.errors.len(), 1);
        assert_eq!(snap.errors[0].code, 2103);
        assert!(state.flush().is_none());
    }
}
