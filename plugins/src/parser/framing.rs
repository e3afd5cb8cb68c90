//! Message framing of TLC's `-tool` output mode.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref START_RE: Regex = Regex::new(r"^@!@!@STARTMSG (\d+):(\d+) @!@!@$").unwrap();
    static ref END_RE: Regex = Regex::new(r"^@!@!@ENDMSG (\d+) @!@!@$").unwrap();
}

pub const SEVERITY_INFO: u32 = 0;
pub const SEVERITY_ERROR: u32 = 1;
pub const SEVERITY_TLC_BUG: u32 = 2;
pub const SEVERITY_WARNING: u32 = 3;
pub const SEVERITY_STATE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<'a> {
    Start { code: u32, severity: u32 },
    End { code: u32 },
    Text(&'a str),
}

pub fn classify(line: &str) -> Frame<'_> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if let Some(c) = START_RE.captures(trimmed) {
        if let (Ok(code), Ok(severity)) = (c[1].parse(), c[2].parse()) {
            return Frame::Start { code, severity };
        }
    }
    if let Some(c) = END_RE.captures(trimmed) {
        if let Ok(code) = c[1].parse() {
            return Frame::End { code };
        }
    }
    Frame::Text(trimmed)
}
