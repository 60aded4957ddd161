//! Scene state: the one record observers read.
//!
//! Only the scheduler actor mutates it, and only through `reconcile`; every
//! mutation is published as a whole new `Arc<SceneState>`.

mod handle;
mod reconcile;

pub use handle::{SceneClosed, SceneHandle};
pub use reconcile::apply;
pub(crate) use reconcile::{begin, clear_log, park, push_notice};

use std::path::Path;
use std::sync::Arc;

use crate::core::{PaneMode, SourceId};
use crate::diagnostic::{LogEntry, Severity, export_log};

/// Render status shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Idle,
    Rendering,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct SceneState {
    /// Generation of the latest accepted request; zero before the first.
    pub generation: u64,
    /// Last good artifact. Never partial.
    pub artifact: Option<Arc<[u8]>>,
    pub log: Vec<LogEntry>,
    pub status: RenderStatus,
    pub pane: PaneMode,
    pub source: SourceId,
}

impl SceneState {
    pub fn new(source: SourceId, pane: PaneMode) -> Self {
        Self {
            generation: 0,
            artifact: None,
            log: Vec::new(),
            status: RenderStatus::Idle,
            pane,
            source,
        }
    }

    /// Entries attributed to source line `line`.
    pub fn messages_for_line(&self, line: u32) -> Vec<&LogEntry> {
        self.log.iter().filter(|e| e.line == Some(line)).collect()
    }

    /// Most severe level present in the log.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.log.iter().map(|e| e.severity).max()
    }

    pub fn export_log(&self, path: &Path) -> anyhow::Result<()> {
        export_log(&self.log, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(line: Option<u32>, severity: Severity, message: &str) -> LogEntry {
        let mut entry = LogEntry::new(severity, message);
        entry.line = line;
        entry
    }

    #[test]
    fn test_new_scene_is_idle() {
        let state = SceneState::new(SourceId::Synthetic("Untitled-1".into()), PaneMode::EditorOnly);
        assert_eq!(state.generation, 0);
        assert_eq!(state.status, RenderStatus::Idle);
        assert!(state.artifact.is_none());
        assert_eq!(state.worst_severity(), None);
    }

    #[test]
    fn test_messages_for_line() {
        let mut state = SceneState::new(SourceId::Synthetic("s".into()), PaneMode::PreviewOnly);
        state.log = vec![
            entry(Some(3), Severity::Warning, "unknown chord"),
            entry(None, Severity::Notice, "processing"),
            entry(Some(3), Severity::Error, "bad directive"),
            entry(Some(4), Severity::Notice, "other"),
        ];

        let messages: Vec<_> = state
            .messages_for_line(3)
            .into_iter()
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(messages, vec!["unknown chord", "bad directive"]);
        assert!(state.messages_for_line(9).is_empty());
        assert_eq!(state.worst_severity(), Some(Severity::Error));
    }

    #[test]
    fn test_export_log() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("song.log");
        let mut state = SceneState::new(SourceId::Synthetic("s".into()), PaneMode::PreviewOnly);
        state.log = vec![entry(Some(1), Severity::Error, "error: x")];

        state.export_log(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("line 1: error: x"));
    }
}
