//! Log export ("Save Log").

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::LogEntry;

/// Format entries one per line: `HH:MM:SS severity [line N: ]message`.
pub fn format_log(entries: &[LogEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.timestamp.format("%H:%M:%S").to_string());
        out.push(' ');
        out.push_str(&format!("{:<7}", entry.severity.label()));
        out.push(' ');
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out
}

/// Write entries to `path`, replacing any previous export.
pub fn export_log(entries: &[LogEntry], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create `{}`", parent.display()))?;
    }
    fs::write(path, format_log(entries))
        .with_context(|| format!("Failed to write log to `{}`", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;

    #[test]
    fn test_format_log() {
        let mut error = LogEntry::error("error: bad directive");
        error.line = Some(5);
        let notice = LogEntry::new(Severity::Notice, "1 song processed");

        let text = format_log(&[error, notice]);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("error   line 5: error: bad directive"));
        assert!(lines[1].ends_with("notice  1 song processed"));
    }

    #[test]
    fn test_export_creates_parent() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("logs/song.log");
        export_log(&[LogEntry::warning("check capo")], &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("warning"));
        assert!(content.contains("check capo"));
    }
}
