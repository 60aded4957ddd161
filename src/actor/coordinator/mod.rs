//! Actor Coordinator - wires up watch mode
//!
//! The Coordinator is a thin orchestrator that:
//! - Opens the scene (its scheduler actor)
//! - Creates the watcher before the first read
//! - Runs the watcher and output actors until shutdown

mod runtime;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;

use super::output::OutputActor;
use super::watcher::WatcherActor;
use crate::cli::Cli;
use crate::config::{RendererConfig, cfg};
use crate::core::SourceId;
use crate::diagnostic::LogEntry;
use crate::logger::is_verbose;
use crate::renderer::{ProcessRenderer, renderer_info, runtime_report};
use crate::scene::SceneHandle;
use crate::utils::path::normalize_path;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    song: PathBuf,
    cli: Arc<Cli>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(song: PathBuf, cli: Arc<Cli>) -> Self {
        Self {
            song,
            cli,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let config = cfg();
        let song = normalize_path(&self.song);

        let renderer = Arc::new(ProcessRenderer::new(config.renderer.clone()));
        let scene = SceneHandle::open(
            renderer,
            SourceId::Path(song.clone()),
            config.preview.pane,
            config.pipeline.debounce(),
        );

        let watcher = WatcherActor::new(&song, scene.sender(), Arc::clone(&self.cli))
            .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;
        let output = OutputActor::new(
            scene.subscribe(),
            scene.diagnostics(),
            config.preview.output_for(&song),
            config.preview.log.clone(),
        );

        announce_renderer(&scene, &config.renderer).await;

        crate::debug!("actor"; "start");
        let shutdown_rx = self.shutdown_rx.take();
        runtime::run_actors(watcher, output, scene, shutdown_rx).await;
        crate::debug!("actor"; "stopped");

        Ok(())
    }
}

/// Log the renderer version; with `--verbose` the full runtime report also
/// goes into the scene log as a notice.
async fn announce_renderer(scene: &SceneHandle, config: &RendererConfig) {
    let config = config.clone();
    let info = tokio::task::spawn_blocking(move || renderer_info(&config))
        .await
        .ok()
        .flatten();

    let Some(info) = info else {
        crate::log!("warning"; "renderer metadata unavailable, directive list is empty");
        return;
    };
    crate::log!("watch"; "renderer chordpro {}", info.general.chordpro.version);
    if is_verbose() {
        let _ = scene
            .append_notice(LogEntry::notice(runtime_report(info)))
            .await;
    }
}
