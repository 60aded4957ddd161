//! Output Actor - scene observer for watch mode
//!
//! Reacts to published scene states: writes each new artifact to the output
//! PDF, exports the log when configured, and keeps the terminal status block
//! current.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::diagnostic::{LogEntry, Severity};
use crate::logger;
use crate::renderer::LiveDiagnostic;
use crate::scene::{RenderStatus, SceneState};
use crate::utils::atomic::write_atomic;

/// Entries shown under a status line before the rest is summarized.
const MAX_SHOWN: usize = 10;

pub struct OutputActor {
    state_rx: watch::Receiver<Arc<SceneState>>,
    live_rx: Option<broadcast::Receiver<LiveDiagnostic>>,
    output: PathBuf,
    log_path: Option<PathBuf>,
    /// (generation, status) of the last state acted on
    seen: (u64, RenderStatus),
    seen_log_len: usize,
}

impl OutputActor {
    pub fn new(
        state_rx: watch::Receiver<Arc<SceneState>>,
        live_rx: Option<broadcast::Receiver<LiveDiagnostic>>,
        output: PathBuf,
        log_path: Option<PathBuf>,
    ) -> Self {
        Self {
            state_rx,
            live_rx,
            output,
            log_path,
            seen: (0, RenderStatus::Idle),
            seen_log_len: 0,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                changed = self.state_rx.changed() => {
                    if changed.is_err() {
                        break; // Scheduler stopped
                    }
                    let state = Arc::clone(&self.state_rx.borrow_and_update());
                    self.on_state(&state);
                }

                Some(live) = recv_live(&mut self.live_rx) => {
                    crate::debug!("render"; "[{}] {}", live.generation, live.entry);
                }
            }
        }
    }

    fn on_state(&mut self, state: &SceneState) {
        let key = (state.generation, state.status);
        if key == self.seen {
            self.on_log_change(state);
            return;
        }
        self.seen = key;
        self.seen_log_len = state.log.len();

        let name = state.source.display_name();
        match state.status {
            RenderStatus::Rendering => {
                crate::debug!("render"; "generation {}", state.generation);
                logger::status_rendering(&format!("rendering {name}"));
            }
            RenderStatus::Succeeded => {
                self.write_artifact(state, &name);
                self.export_log(state);
            }
            RenderStatus::Failed => {
                logger::status_error(&format!("render failed: {name}"), &summarize_log(&state.log));
                self.export_log(state);
            }
            RenderStatus::Idle if state.generation > 0 => {
                logger::status_unchanged(&format!("{name}: preview off ({})", state.pane.label()));
            }
            RenderStatus::Idle => {}
        }
    }

    /// Log changed outside a render cycle (cleared, or a notice appended).
    fn on_log_change(&mut self, state: &SceneState) {
        if state.log.len() > self.seen_log_len {
            for entry in &state.log[self.seen_log_len..] {
                logger::log_entry(entry);
            }
        }
        self.seen_log_len = state.log.len();
    }

    fn write_artifact(&self, state: &SceneState, name: &str) {
        let Some(artifact) = &state.artifact else {
            return;
        };

        if let Err(e) = write_atomic(&self.output, artifact) {
            logger::status_error(&format!("cannot write preview for {name}"), &format!("{e:#}"));
            return;
        }

        let summary = format!(
            "rendered {} → {} ({})",
            name,
            self.output.display(),
            format_size(artifact.len())
        );
        match state.worst_severity() {
            Some(Severity::Warning | Severity::Error) => {
                logger::status_warning(&format!("{summary}\n{}", summarize_log(&state.log)));
            }
            _ => logger::status_success(&summary),
        }
    }

    fn export_log(&self, state: &SceneState) {
        if let Some(path) = &self.log_path
            && let Err(e) = state.export_log(path)
        {
            crate::log!("warning"; "{:#}", e);
        }
    }
}

/// Next live diagnostic; pending forever without a receiver.
async fn recv_live(rx: &mut Option<broadcast::Receiver<LiveDiagnostic>>) -> Option<LiveDiagnostic> {
    let Some(receiver) = rx.as_mut() else {
        return std::future::pending().await;
    };
    loop {
        match receiver.recv().await {
            Ok(live) => return Some(live),
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => {
                *rx = None;
                return std::future::pending().await;
            }
        }
    }
}

/// Log entries as status detail lines, capped at [`MAX_SHOWN`].
pub(crate) fn summarize_log(log: &[LogEntry]) -> String {
    let mut lines: Vec<String> = log
        .iter()
        .take(MAX_SHOWN)
        .map(logger::status_line)
        .collect();
    let remaining = log.len().saturating_sub(MAX_SHOWN);
    if remaining > 0 {
        lines.push(format!("  ... and {remaining} more"));
    }
    lines.join("\n")
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < KIB * KIB {
        format!("{:.1} KiB", bytes / KIB)
    } else {
        format!("{:.1} MiB", bytes / (KIB * KIB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PaneMode, SourceId};

    fn entry(severity: Severity, line: Option<u32>, message: &str) -> LogEntry {
        let mut entry = LogEntry::new(severity, message);
        entry.line = line;
        entry
    }

    #[test]
    fn test_summarize_log() {
        let log = vec![
            entry(Severity::Error, Some(5), "error: bad directive"),
            entry(Severity::Notice, None, "1 song"),
        ];
        assert_eq!(
            summarize_log(&log),
            "  error   line 5: error: bad directive\n  notice  1 song"
        );
    }

    #[test]
    fn test_summarize_log_caps_entries() {
        let log: Vec<_> = (0..13)
            .map(|i| entry(Severity::Warning, Some(i), "unknown chord"))
            .collect();
        let summary = summarize_log(&log);
        assert_eq!(summary.lines().count(), MAX_SHOWN + 1);
        assert!(summary.ends_with("... and 3 more"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(12_698), "12.4 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }

    #[tokio::test]
    async fn test_success_writes_artifact_and_log() {
        let temp = tempfile::TempDir::new().unwrap();
        let output = temp.path().join("song.pdf");
        let log_path = temp.path().join("song.log");

        let mut state = SceneState::new(SourceId::Path(temp.path().join("song.cho")), PaneMode::PreviewOnly);
        let (tx, rx) = watch::channel(Arc::new(state.clone()));
        let actor = OutputActor::new(rx, None, output.clone(), Some(log_path.clone()));
        let task = tokio::spawn(actor.run());

        state.generation = 1;
        state.status = RenderStatus::Succeeded;
        state.artifact = Some(Arc::from(&b"%PDF-1.7"[..]));
        state.log = vec![entry(Severity::Notice, None, "1 song processed")];
        tx.send_replace(Arc::new(state));
        drop(tx);
        task.await.unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), b"%PDF-1.7");
        assert!(std::fs::read_to_string(&log_path).unwrap().contains("1 song processed"));
    }
}
