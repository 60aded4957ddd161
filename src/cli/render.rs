//! `render` command: one render through the same invoker as watch mode.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio_util::sync::CancellationToken;

use crate::actor::output::{format_size, summarize_log};
use crate::config::ProjectConfig;
use crate::core::{DocumentSnapshot, SourceId};
use crate::diagnostic::export_log;
use crate::log;
use crate::renderer::{ProcessRenderer, RenderOutcome, RenderRequest, Renderer};
use crate::utils::atomic::write_atomic;
use crate::utils::path::normalize_path;

/// Render `song` once, writing the PDF and printing its diagnostics.
///
/// Fails when the render fails, so the exit status reflects the outcome.
pub fn render_song(song: &Path, config: &ProjectConfig, shutdown_rx: Receiver<()>) -> Result<()> {
    let song = normalize_path(song);
    let text = fs::read_to_string(&song)
        .with_context(|| format!("Failed to read {}", song.display()))?;
    let snapshot = DocumentSnapshot::new(
        text,
        Arc::new(config.render.clone()),
        SourceId::Path(song.clone()),
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    std::thread::spawn(move || {
        if shutdown_rx.recv().is_ok() {
            on_signal.cancel();
        }
    });

    let renderer = ProcessRenderer::new(config.renderer.clone());
    let request = RenderRequest {
        generation: 1,
        snapshot,
        pane: config.preview.pane,
    };
    let result = rt.block_on(renderer.render(request, cancel));

    if let Some(path) = &config.preview.log {
        export_log(&result.log, path)?;
    }
    if !result.log.is_empty() {
        println!("{}", summarize_log(&result.log));
    }

    match result.outcome {
        RenderOutcome::Success(pdf) => {
            let output = config.preview.output_for(&song);
            write_atomic(&output, &pdf)?;
            log!("render"; "{} ({})", output.display(), format_size(pdf.len()));
            Ok(())
        }
        RenderOutcome::Failed { exit_code: Some(code) } => {
            anyhow::bail!("render failed (renderer exited with {code})")
        }
        RenderOutcome::Failed { exit_code: None } => anyhow::bail!("render failed"),
        RenderOutcome::Cancelled => anyhow::bail!("render cancelled"),
    }
}
