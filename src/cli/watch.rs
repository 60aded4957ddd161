//! `watch` command: live preview until Ctrl+C.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;

use super::Cli;
use crate::actor::Coordinator;
use crate::log;

/// Watch `song` and keep its preview current.
pub fn watch_song(song: &Path, cli: Arc<Cli>, shutdown_rx: Receiver<()>) -> Result<()> {
    if !song.is_file() {
        anyhow::bail!("song not found: {}", song.display());
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    log!("watch"; "press Ctrl+C to stop");
    rt.block_on(async {
        Coordinator::new(song.to_path_buf(), cli)
            .with_shutdown_signal(shutdown_rx)
            .run()
            .await
    })
}
