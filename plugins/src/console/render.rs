//! Plain-text rendering of check snapshots.

use tlcrun_core::api::{CheckPhase, CheckSnapshot, CheckVerdict, ProgressStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub ok: &'static str,
    pub fail: &'static str,
    pub warn: &'static str,
    pub bullet: &'static str,
    pub busy: &'static str,
    pub rule: &'static str,
}

impl Markers {
    pub const UNICODE: Markers = Markers {
        ok: "✓",
        fail: "✗",
        warn: "⚠",
        bullet: "•",
        busy: "⚙",
        rule: "─",
    };

    pub const ASCII: Markers = Markers {
        ok: "+",
        fail: "x",
        warn: "!",
        bullet: "-",
        busy: "*",
        rule: "-",
    };

    pub fn select(ascii: bool) -> Self {
        if ascii {
            Self::ASCII
        } else {
            Self::UNICODE
        }
    }
}

/// What has already been printed for the current run.
#[derive(Debug, Default)]
pub struct RenderCursor {
    phase: CheckPhase,
    progress: usize,
    errors: usize,
    warnings: usize,
    verdict: Option<CheckVerdict>,
}

pub fn header(m: &Markers) -> String {
    let rule = m.rule.repeat(3);
    format!("{rule} TLA+ model checking {rule}")
}

pub fn phase_label(phase: CheckPhase) -> &'static str {
    match phase {
        CheckPhase::NotStarted => "not started",
        CheckPhase::Starting => "starting",
        CheckPhase::SanyParsing => "parsing specification",
        CheckPhase::ComputingInit => "computing initial states",
        CheckPhase::Checking => "checking",
        CheckPhase::CheckingLiveness => "checking temporal properties",
        CheckPhase::Finished => "finished",
    }
}

/// Lines for whatever changed since the cursor was last advanced.
pub fn render_update(cursor: &mut RenderCursor, s: &CheckSnapshot, m: &Markers) -> Vec<String> {
    let mut out = Vec::new();

    if s.phase != cursor.phase {
        cursor.phase = s.phase;
        out.push(format!("{} {}", m.bullet, phase_label(s.phase)));
    }

    for p in s.progress.iter().skip(cursor.progress) {
        out.push(format!("  {}", progress_line(p)));
    }
    cursor.progress = s.progress.len();

    for w in s.warnings.iter().skip(cursor.warnings) {
        out.push(format!("{} {}", m.warn, first_line(w)));
    }
    cursor.warnings = s.warnings.len();

    for e in s.errors.iter().skip(cursor.errors) {
        out.push(format!("{} [{}] {}", m.fail, e.code, first_line(&e.message)));
    }
    cursor.errors = s.errors.len();

    if s.phase == CheckPhase::Finished && s.verdict != cursor.verdict {
        cursor.verdict = s.verdict;
        out.push(verdict_line(s, m));
    }
    out
}

pub fn render_summary(s: Option<&CheckSnapshot>, m: &Markers) -> Vec<String> {
    let Some(s) = s else {
        return vec!["No model checking results yet".to_string()];
    };

    let mut out = vec![header(m), format!("model:  {}", s.model_file.display())];
    out.push(format!("status: {}", phase_label(s.phase)));
    if let Some(mode) = &s.mode {
        out.push(format!("mode:   {mode}"));
    }
    if let Some(started) = s.started_at {
        out.push(format!("start:  {}", started.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    if let (Some(start), Some(end)) = (s.started_at, s.finished_at) {
        let secs = (end - start).num_seconds().max(0);
        out.push(format!("time:   {secs}s"));
    }
    if let Some(p) = s.progress.last() {
        out.push(format!("states: {}", progress_line(p)));
    }
    if !s.coverage.is_empty() {
        let never = s.coverage.iter().filter(|c| c.total == 0).count();
        out.push(format!(
            "coverage: {} actions, {} never enabled",
            s.coverage.len(),
            never
        ));
        for c in s.coverage.iter().filter(|c| c.total == 0) {
            out.push(format!(
                "  {} {}!{} (line {})",
                m.warn,
                c.module,
                c.action,
                c.range.start.line + 1
            ));
        }
    }
    for e in &s.errors {
        out.push(format!("{} [{}]", m.fail, e.code));
        for line in e.message.lines() {
            out.push(format!("    {line}"));
        }
    }
    if s.phase == CheckPhase::Finished {
        out.push(verdict_line(s, m));
    }
    out
}

fn verdict_line(s: &CheckSnapshot, m: &Markers) -> String {
    match s.verdict {
        Some(CheckVerdict::Success) => format!("{} No errors found", m.ok),
        Some(CheckVerdict::Error) => format!("{} Finished with {} error(s)", m.fail, s.errors.len()),
        None => format!("{} Finished without a verdict", m.warn),
    }
}

fn progress_line(p: &ProgressStats) -> String {
    let mut line = format!(
        "{} generated, {} distinct, {} left",
        group_digits(p.generated),
        group_digits(p.distinct),
        group_digits(p.left)
    );
    if let Some(d) = p.diameter {
        line.push_str(&format!(" (depth {d})"));
    }
    line
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
