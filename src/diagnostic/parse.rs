//! Diagnostic line parser.
//!
//! Lines look like `<source>:<line>: <message>`. The source prefix may be
//! quoted (`"song.cho":12: ...`). Every input line yields exactly one entry:
//! lines without the source prefix become unattributed notices.

use std::sync::OnceLock;

use chrono::{DateTime, Local};
use regex::Regex;

use super::{LogEntry, Severity};
use crate::utils::exec::strip_ansi;

/// Parse one raw diagnostic line, timestamped now.
pub fn parse_line(raw: &str, source: &str) -> LogEntry {
    parse_line_at(raw, source, Local::now())
}

/// Parse one raw diagnostic line with an explicit timestamp.
pub fn parse_line_at(raw: &str, source: &str, timestamp: DateTime<Local>) -> LogEntry {
    let plain = strip_ansi(raw);
    let line = plain.trim_end();

    let Some(rest) = strip_source(line, source) else {
        return LogEntry {
            timestamp,
            severity: Severity::Notice,
            line: None,
            message: line.trim_start().to_string(),
        };
    };

    let (line_number, message) = split_line_number(rest);
    LogEntry {
        timestamp,
        severity: classify(message),
        line: line_number,
        message: message.to_string(),
    }
}

/// Strip `source:` or `"source":` from the start of `line`.
fn strip_source<'a>(line: &'a str, source: &str) -> Option<&'a str> {
    if source.is_empty() {
        return None;
    }
    let line = line.trim_start();
    line.strip_prefix(source)
        .and_then(|rest| rest.strip_prefix(':'))
        .or_else(|| {
            line.strip_prefix('"')
                .and_then(|rest| rest.strip_prefix(source))
                .and_then(|rest| rest.strip_prefix("\":"))
        })
}

/// Split `12: message` into the line number and the message.
fn split_line_number(rest: &str) -> (Option<u32>, &str) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[ \t]*([0-9]+):(.*)$").unwrap());

    match re.captures(rest) {
        Some(caps) => {
            let number = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let message = caps.get(2).map_or("", |m| m.as_str().trim());
            (number, message)
        }
        None => (None, rest.trim()),
    }
}

/// Severity by keyword, highest first.
fn classify(message: &str) -> Severity {
    let lower = message.to_ascii_lowercase();
    if lower.contains("error") {
        Severity::Error
    } else if lower.contains("warning") {
        Severity::Warning
    } else {
        Severity::Notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributed_notice() {
        let entry = parse_line("song.cho:12: unknown chord", "song.cho");
        assert_eq!(entry.line, Some(12));
        assert_eq!(entry.severity, Severity::Notice);
        assert_eq!(entry.message, "unknown chord");
    }

    #[test]
    fn test_attributed_error() {
        let entry = parse_line("song.cho:5: error: bad directive", "song.cho");
        assert_eq!(entry.line, Some(5));
        assert_eq!(entry.severity, Severity::Error);
        assert_eq!(entry.message, "error: bad directive");
    }

    #[test]
    fn test_severity_case_insensitive() {
        let entry = parse_line("song.cho:3: WARNING: Chord [Hx] unknown", "song.cho");
        assert_eq!(entry.severity, Severity::Warning);

        let entry = parse_line("song.cho:3: Warning and Error both", "song.cho");
        assert_eq!(entry.severity, Severity::Error);
    }

    #[test]
    fn test_quoted_source_prefix() {
        let entry = parse_line("\"/tmp/.preview-x.cho\":8: unterminated chord", "/tmp/.preview-x.cho");
        assert_eq!(entry.line, Some(8));
        assert_eq!(entry.message, "unterminated chord");
    }

    #[test]
    fn test_source_without_line_number() {
        let entry = parse_line("song.cho: error: cannot open", "song.cho");
        assert_eq!(entry.line, None);
        assert_eq!(entry.severity, Severity::Error);
        assert_eq!(entry.message, "error: cannot open");
    }

    #[test]
    fn test_unmatched_line_is_notice() {
        let entry = parse_line("Processing: 1 song, 2 pages", "song.cho");
        assert_eq!(entry.line, None);
        assert_eq!(entry.severity, Severity::Notice);
        assert_eq!(entry.message, "Processing: 1 song, 2 pages");

        // another file's diagnostics are not attributed to this source
        let entry = parse_line("other.cho:4: error: boom", "song.cho");
        assert_eq!(entry.line, None);
        assert_eq!(entry.severity, Severity::Notice);
    }

    #[test]
    fn test_empty_line_still_yields_entry() {
        let entry = parse_line("", "song.cho");
        assert_eq!(entry.message, "");
        assert_eq!(entry.severity, Severity::Notice);
    }

    #[test]
    fn test_ansi_and_trailing_whitespace_stripped() {
        let entry = parse_line("\x1b[31msong.cho:2: error: x\x1b[0m\r", "song.cho");
        assert_eq!(entry.line, Some(2));
        assert_eq!(entry.message, "error: x");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let at = Local::now();
        let first = parse_line_at("song.cho:5: error: bad directive", "song.cho", at);
        let second = parse_line_at("song.cho:5: error: bad directive", "song.cho", at);
        assert_eq!(first, second);
    }

    #[test]
    fn test_prefix_must_be_followed_by_colon() {
        let entry = parse_line("song.chorus:1: x", "song.cho");
        assert_eq!(entry.line, None);
        assert_eq!(entry.message, "song.chorus:1: x");
    }

    #[test]
    fn test_padded_line_number_and_non_ascii_message() {
        let entry = parse_line("song.cho:\t 7: warning: akkoord «Hx» onbekend", "song.cho");
        assert_eq!(entry.line, Some(7));
        assert_eq!(entry.severity, Severity::Warning);
        assert_eq!(entry.message, "warning: akkoord «Hx» onbekend");
    }

    #[test]
    fn test_line_number_regex_compiles() {
        assert_eq!(split_line_number("12: unknown chord"), (Some(12), "unknown chord"));
        assert_eq!(split_line_number("x12: y"), (None, "x12: y"));
    }
}
