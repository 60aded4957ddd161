//! Process renderer tests, driving `sh -c` scripts as the renderer.
//!
//! The script receives the renderer arguments as `$1..`; `for last; do :; done`
//! leaves the input argument in `$last`.

#![cfg(unix)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use super::*;
use crate::config::{InputMode, RenderSettings, RendererConfig};
use crate::core::SourceId;
use crate::diagnostic::Severity;

const SONG: &str = "{title: Amazing Grace}\n[G]Amazing [C]grace";

fn renderer(script: &str) -> ProcessRenderer {
    ProcessRenderer::new(script_config(script))
}

fn script_config(script: &str) -> RendererConfig {
    RendererConfig {
        command: vec![
            "sh".into(),
            "-c".into(),
            format!("for last; do :; done; {script}"),
            "chordpro".into(),
        ],
        timeout_ms: 5_000,
        grace_ms: 200,
        ..RendererConfig::default()
    }
}

fn request(generation: u64) -> RenderRequest {
    request_with(generation, RenderSettings::default())
}

fn request_with(generation: u64, settings: RenderSettings) -> RenderRequest {
    RenderRequest {
        generation,
        snapshot: DocumentSnapshot::new(
            SONG,
            Arc::new(settings),
            SourceId::Synthetic("Untitled-1".into()),
        ),
        pane: PaneMode::EditorAndPreview,
    }
}

async fn render(renderer: &ProcessRenderer, request: RenderRequest) -> RenderResult {
    renderer.render(request, CancellationToken::new()).await
}

#[tokio::test]
async fn test_success_captures_stdout() {
    let result = render(&renderer("cat \"$last\""), request(1)).await;

    assert_eq!(result.generation, 1);
    assert_eq!(result.outcome, RenderOutcome::Success(Arc::from(SONG.as_bytes())));
    assert!(result.log.is_empty());
}

#[tokio::test]
async fn test_stdin_input() {
    let renderer = ProcessRenderer::new(RendererConfig {
        input: InputMode::Stdin,
        ..script_config("[ \"$last\" = \"-\" ] && cat")
    });
    let result = render(&renderer, request(2)).await;
    assert_eq!(result.outcome, RenderOutcome::Success(Arc::from(SONG.as_bytes())));
}

#[tokio::test]
async fn test_arguments_reach_renderer() {
    let settings = RenderSettings {
        transpose: 2,
        diagrams: false,
        ..RenderSettings::default()
    };
    let result = render(&renderer("printf '%s\\n' \"$@\""), request_with(1, settings)).await;

    let RenderOutcome::Success(bytes) = result.outcome else {
        panic!("unexpected outcome: {:?}", result.outcome);
    };
    let text = String::from_utf8_lossy(&bytes);
    let args: Vec<_> = text.lines().collect();
    assert_eq!(&args[..4], &["--generate=PDF", "--output=-", "--transpose=2", "--no-chord-grids"]);
    assert!(args[4].ends_with(".cho"));
}

#[tokio::test]
async fn test_diagnostics_parsed_against_input() {
    let script = "echo \"$last:3: Warning: unknown chord Hx\" >&2; \
                  echo \"\\\"$last\\\":7: error: unterminated chord\" >&2; \
                  echo 'Processing 1 song' >&2; \
                  printf '%%PDF-1.7'";
    let result = render(&renderer(script), request(4)).await;

    assert!(matches!(result.outcome, RenderOutcome::Success(_)));
    assert_eq!(result.log.len(), 3);
    assert_eq!(result.log[0].severity, Severity::Warning);
    assert_eq!(result.log[0].line, Some(3));
    assert_eq!(result.log[0].message, "Warning: unknown chord Hx");
    assert_eq!(result.log[1].severity, Severity::Error);
    assert_eq!(result.log[1].line, Some(7));
    assert_eq!(result.log[2].severity, Severity::Notice);
    assert_eq!(result.log[2].line, None);
}

#[tokio::test]
async fn test_empty_output_fails() {
    let result = render(&renderer("exit 0"), request(1)).await;

    assert_eq!(result.outcome, RenderOutcome::Failed { exit_code: Some(0) });
    assert_eq!(result.log.len(), 1);
    assert!(result.log[0].is_error());
}

#[tokio::test]
async fn test_nonzero_exit_discards_output() {
    let script = "echo \"$last:5: error: bad directive\" >&2; printf 'partial'; exit 2";
    let result = render(&renderer(script), request(1)).await;

    assert_eq!(result.outcome, RenderOutcome::Failed { exit_code: Some(2) });
    assert_eq!(result.log.len(), 1);
    assert_eq!(result.log[0].line, Some(5));
}

#[tokio::test]
async fn test_timeout_kills_renderer() {
    let renderer = ProcessRenderer::new(RendererConfig {
        timeout_ms: 300,
        ..script_config("echo starting >&2; sleep 10")
    });

    let start = Instant::now();
    let result = render(&renderer, request(1)).await;

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(result.outcome, RenderOutcome::Failed { exit_code: None });
    let last = result.log.last().unwrap();
    assert!(last.is_error());
    assert!(last.message.contains("timed out"));
}

#[tokio::test]
async fn test_cancel_terminates_renderer() {
    let renderer = Arc::new(renderer("echo working >&2; sleep 10; printf late"));
    let cancel = CancellationToken::new();

    let task = tokio::spawn({
        let renderer = Arc::clone(&renderer);
        let cancel = cancel.clone();
        async move { renderer.render(request(9), cancel).await }
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    let start = Instant::now();
    cancel.cancel();
    let result = task.await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(result.generation, 9);
    assert_eq!(result.outcome, RenderOutcome::Cancelled);
    assert!(result.log.is_empty());
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = renderer("cat \"$last\"").render(request(3), cancel).await;
    assert_eq!(result.outcome, RenderOutcome::Cancelled);
}

#[tokio::test]
async fn test_transient_input_removed() {
    let result = render(&renderer("printf '%s' \"$last\""), request(1)).await;

    let RenderOutcome::Success(bytes) = result.outcome else {
        panic!("unexpected outcome: {:?}", result.outcome);
    };
    let path = PathBuf::from(String::from_utf8_lossy(&bytes).into_owned());
    assert!(path.is_absolute());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_missing_executable() {
    let renderer = ProcessRenderer::new(RendererConfig {
        command: vec!["chordpro-preview-no-such-renderer".into()],
        ..RendererConfig::default()
    });
    let result = render(&renderer, request(1)).await;

    assert_eq!(result.outcome, RenderOutcome::Failed { exit_code: None });
    assert_eq!(result.log.len(), 1);
    assert!(result.log[0].is_error());
    assert!(result.log[0].message.contains("not found"));
}

#[tokio::test]
async fn test_empty_command() {
    let renderer = ProcessRenderer::new(RendererConfig {
        command: Vec::new(),
        ..RendererConfig::default()
    });
    let result = render(&renderer, request(1)).await;
    assert_eq!(result.outcome, RenderOutcome::Failed { exit_code: None });
    assert!(result.log[0].message.contains("empty"));
}

#[tokio::test]
async fn test_live_diagnostics_arrive_before_exit() {
    let renderer = renderer("echo \"$last:2: warning: capo\" >&2; sleep 1; printf x");
    let mut live = renderer.live_diagnostics().unwrap();

    let task = tokio::spawn(renderer.render(request(6), CancellationToken::new()));

    let published = tokio::time::timeout(Duration::from_secs(5), live.recv())
        .await
        .expect("no live diagnostic within 5s")
        .unwrap();
    assert!(!task.is_finished(), "diagnostic was only published after exit");
    assert_eq!(published.generation, 6);
    assert_eq!(published.entry.line, Some(2));
    assert_eq!(published.entry.severity, Severity::Warning);

    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("render did not finish")
        .unwrap();
    assert!(matches!(result.outcome, RenderOutcome::Success(_)));
    assert_eq!(published.entry, result.log[0]);
}

#[tokio::test]
async fn test_many_attributed_diagnostics() {
    let renderer = ProcessRenderer::new(RendererConfig {
        timeout_ms: 30_000,
        ..script_config(
            "i=0; while [ $i -lt 5000 ]; do echo \"$last:$i: warning: unknown chord\" >&2; i=$((i+1)); done; printf x",
        )
    });
    let result = tokio::time::timeout(Duration::from_secs(30), render(&renderer, request(7)))
        .await
        .expect("render did not finish");

    assert!(matches!(result.outcome, RenderOutcome::Success(_)));
    assert_eq!(result.log.len(), 5000);
    assert_eq!(result.log[4999].line, Some(4999));
    assert!(result.log.iter().all(|e| e.severity == Severity::Warning));
}
