//! Scene handle: the editor-facing side of one open document.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use super::SceneState;
use crate::actor::messages::SceneEvent;
use crate::actor::scheduler::Scheduler;
use crate::core::{DocumentSnapshot, PaneMode, SourceId};
use crate::diagnostic::LogEntry;
use crate::renderer::{LiveDiagnostic, Renderer};

const EVENT_BUFFER: usize = 32;

/// The scene's scheduler has stopped.
#[derive(Debug, Error)]
#[error("scene is closed")]
pub struct SceneClosed;

/// Owns the scheduler actor of one scene.
///
/// Every operation goes through the actor's event queue, so they apply in
/// the order they were sent.
pub struct SceneHandle {
    tx: mpsc::Sender<SceneEvent>,
    state_rx: watch::Receiver<Arc<SceneState>>,
    renderer: Arc<dyn Renderer>,
    task: JoinHandle<()>,
}

impl SceneHandle {
    /// Start the scheduler for a new scene. Must be called within a runtime.
    pub fn open(
        renderer: Arc<dyn Renderer>,
        source: SourceId,
        pane: PaneMode,
        debounce: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let state = SceneState::new(source, pane);
        let (state_tx, state_rx) = watch::channel(Arc::new(state.clone()));

        let scheduler = Scheduler::new(rx, Arc::clone(&renderer), state, state_tx, debounce);
        let task = tokio::spawn(scheduler.run());

        Self {
            tx,
            state_rx,
            renderer,
            task,
        }
    }

    pub async fn edit(&self, snapshot: DocumentSnapshot) -> Result<(), SceneClosed> {
        self.send(SceneEvent::Edit(snapshot)).await
    }

    pub async fn set_pane(&self, pane: PaneMode) -> Result<(), SceneClosed> {
        self.send(SceneEvent::SetPane(pane)).await
    }

    /// Re-render the latest document even if nothing changed.
    pub async fn refresh(&self) -> Result<(), SceneClosed> {
        self.send(SceneEvent::Refresh).await
    }

    pub async fn clear_log(&self) -> Result<(), SceneClosed> {
        self.send(SceneEvent::ClearLog).await
    }

    /// Append an entry outside any render cycle.
    pub async fn append_notice(&self, entry: LogEntry) -> Result<(), SceneClosed> {
        self.send(SceneEvent::AppendNotice(entry)).await
    }

    /// Event queue sender, for actors feeding this scene.
    pub fn sender(&self) -> mpsc::Sender<SceneEvent> {
        self.tx.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SceneState>> {
        self.state_rx.clone()
    }

    pub fn current(&self) -> Arc<SceneState> {
        Arc::clone(&self.state_rx.borrow())
    }

    /// Diagnostics of running renders, tagged with their generation.
    pub fn diagnostics(&self) -> Option<broadcast::Receiver<LiveDiagnostic>> {
        self.renderer.live_diagnostics()
    }

    pub fn export_log(&self, path: &Path) -> anyhow::Result<()> {
        self.current().export_log(path)
    }

    /// Cancel any in-flight render and stop the scheduler.
    pub async fn close(self) {
        let _ = self.tx.send(SceneEvent::Shutdown).await;
        let _ = self.task.await;
    }

    async fn send(&self, event: SceneEvent) -> Result<(), SceneClosed> {
        self.tx.send(event).await.map_err(|_| SceneClosed)
    }
}
