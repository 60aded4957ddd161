//! Renderer subprocess.
//!
//! One child per request. stdout and stderr are drained by their own tasks
//! while the exit is awaited, so a chatty renderer can never block on a full
//! pipe. Every wait is raced against the request's cancellation token and
//! the timeout ceiling.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::input::RenderInput;
use super::terminate::{kill, terminate};
use super::{
    LiveDiagnostic, RenderError, RenderFuture, RenderRequest, RenderResult, Renderer, build_args,
};
use crate::config::RendererConfig;
use crate::diagnostic::{LogEntry, parse_line};

/// Live diagnostics kept for slow subscribers.
const LIVE_BUFFER: usize = 256;

/// Renders by running the configured external program.
pub struct ProcessRenderer {
    config: Arc<RendererConfig>,
    live: broadcast::Sender<LiveDiagnostic>,
}

impl ProcessRenderer {
    pub fn new(config: RendererConfig) -> Self {
        let (live, _) = broadcast::channel(LIVE_BUFFER);
        Self {
            config: Arc::new(config),
            live,
        }
    }
}

impl Renderer for ProcessRenderer {
    fn render(&self, request: RenderRequest, cancel: CancellationToken) -> RenderFuture {
        let config = Arc::clone(&self.config);
        let live = self.live.clone();
        Box::pin(async move { invoke(&config, &live, request, &cancel).await })
    }

    fn live_diagnostics(&self) -> Option<broadcast::Receiver<LiveDiagnostic>> {
        Some(self.live.subscribe())
    }
}

/// How the wait for the child ended.
enum Ending {
    Cancelled,
    TimedOut,
    Exited(std::io::Result<ExitStatus>, Vec<u8>),
}

async fn invoke(
    config: &RendererConfig,
    live: &broadcast::Sender<LiveDiagnostic>,
    request: RenderRequest,
    cancel: &CancellationToken,
) -> RenderResult {
    let generation = request.generation;
    if cancel.is_cancelled() {
        return RenderResult::cancelled(generation);
    }

    match run(config, live, &request, cancel).await {
        Ok(result) => result,
        Err(err) => {
            crate::debug!("render"; "generation {}: {}", generation, err);
            RenderResult::failed(generation, None, vec![err.to_entry()])
        }
    }
}

async fn run(
    config: &RendererConfig,
    live: &broadcast::Sender<LiveDiagnostic>,
    request: &RenderRequest,
    cancel: &CancellationToken,
) -> Result<RenderResult, RenderError> {
    let generation = request.generation;
    let snapshot = &request.snapshot;

    // Held until this function returns; dropping it removes the file.
    let input = RenderInput::prepare(snapshot, config.input)?;
    let (program, leading) = resolve_program(&config.command)?;
    let stdin_text = input.stdin_text();

    let mut cmd = Command::new(&program);
    cmd.args(leading)
        .args(build_args(&snapshot.settings, &input.argument()))
        .stdin(if stdin_text.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Relative `{image}` and `{include}` paths resolve against the song
    if let Some(dir) = snapshot.source.path().and_then(Path::parent)
        && dir.is_dir()
    {
        cmd.current_dir(dir);
    }

    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(|source| RenderError::Spawn {
        program: program.display().to_string(),
        source,
    })?;
    let pid = child.id();
    crate::debug!("render"; "generation {} started (pid {:?})", generation, pid);

    let sink = DiagnosticSink {
        generation,
        source: input.source_name(),
        live: live.clone(),
    };
    let mut io = ChildIo::attach(&mut child, stdin_text, sink);

    let deadline = tokio::time::sleep(config.timeout());
    tokio::pin!(deadline);

    let ending = tokio::select! {
        biased;
        _ = cancel.cancelled() => Ending::Cancelled,
        _ = &mut deadline => Ending::TimedOut,
        (status, stdout) = wait_and_drain(&mut child, &mut io) => Ending::Exited(status, stdout),
    };

    match ending {
        Ending::Cancelled => {
            terminate(&mut child, pid, config.grace()).await;
            crate::debug!("render"; "generation {} cancelled", generation);
            Ok(RenderResult::cancelled(generation))
        }
        Ending::TimedOut => {
            kill(&mut child, pid, config.grace()).await;
            let mut log = io.entries_within(config.grace()).await;
            log.push(LogEntry::error(format!(
                "renderer timed out after {:.1}s",
                config.timeout().as_secs_f64()
            )));
            Ok(RenderResult::failed(generation, None, log))
        }
        Ending::Exited(status, stdout) => {
            let status = status.map_err(RenderError::Wait)?;
            Ok(classify_exit(generation, status, stdout, io.take_entries()))
        }
    }
}

/// Resolve the program on `PATH`; the rest of `command` are leading args.
fn resolve_program(command: &[String]) -> Result<(PathBuf, &[String]), RenderError> {
    let (program, leading) = command
        .split_first()
        .filter(|(program, _)| !program.trim().is_empty())
        .ok_or(RenderError::EmptyCommand)?;
    let path = which::which(program).map_err(|source| RenderError::NotFound {
        program: program.clone(),
        source,
    })?;
    Ok((path, leading))
}

/// Wait for exit, then for both pipes to reach EOF.
async fn wait_and_drain(
    child: &mut Child,
    io: &mut ChildIo,
) -> (std::io::Result<ExitStatus>, Vec<u8>) {
    let status = child.wait().await;
    let stdout = io.drain().await;
    (status, stdout)
}

fn classify_exit(
    generation: u64,
    status: ExitStatus,
    stdout: Vec<u8>,
    mut log: Vec<LogEntry>,
) -> RenderResult {
    if !status.success() {
        crate::debug!("render"; "generation {} failed: {}", generation, status);
        return RenderResult::failed(generation, status.code(), log);
    }
    if stdout.is_empty() {
        log.push(LogEntry::error("renderer exited successfully but produced no output"));
        return RenderResult::failed(generation, status.code(), log);
    }
    RenderResult::success(generation, stdout, log)
}

// ============================================================================
// Pipe tasks
// ============================================================================

/// Where parsed stderr lines go.
struct DiagnosticSink {
    generation: u64,
    source: String,
    live: broadcast::Sender<LiveDiagnostic>,
}

/// Pipe tasks of one child. Aborted on drop.
struct ChildIo {
    stdin: Option<JoinHandle<()>>,
    stdout: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    stderr: Option<JoinHandle<()>>,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl ChildIo {
    fn attach(child: &mut Child, stdin_text: Option<Arc<str>>, sink: DiagnosticSink) -> Self {
        let entries = Arc::new(Mutex::new(Vec::new()));

        let stdin = child.stdin.take().zip(stdin_text).map(|(mut pipe, text)| {
            tokio::spawn(async move {
                // A renderer that exits early closes the pipe; not an error here
                let _ = pipe.write_all(text.as_bytes()).await;
                let _ = pipe.shutdown().await;
            })
        });

        let stdout = child.stdout.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                pipe.read_to_end(&mut buf).await?;
                Ok(buf)
            })
        });

        let stderr = child
            .stderr
            .take()
            .map(|pipe| tokio::spawn(read_diagnostics(pipe, sink, Arc::clone(&entries))));

        Self {
            stdin,
            stdout,
            stderr,
            entries,
        }
    }

    /// Wait for both output pipes to close; returns stdout.
    ///
    /// A reader that failed leaves an error entry and yields no output.
    async fn drain(&mut self) -> Vec<u8> {
        let mut stdout = Vec::new();
        if let Some(handle) = self.stdout.as_mut() {
            match handle.await {
                Ok(Ok(bytes)) => stdout = bytes,
                Ok(Err(e)) => self.reader_failed("output", &e),
                Err(e) => self.reader_failed("output", &e),
            }
            self.stdout = None;
        }
        if let Some(handle) = self.stderr.as_mut() {
            if let Err(e) = handle.await {
                self.reader_failed("diagnostic", &e);
            }
            self.stderr = None;
        }
        stdout
    }

    /// Entries parsed so far, after giving stderr up to `limit` to close.
    async fn entries_within(&mut self, limit: Duration) -> Vec<LogEntry> {
        if let Some(handle) = self.stderr.as_mut()
            && let Ok(joined) = tokio::time::timeout(limit, handle).await
        {
            if let Err(e) = joined {
                self.reader_failed("diagnostic", &e);
            }
            self.stderr = None;
        }
        self.take_entries()
    }

    fn reader_failed(&self, pipe: &str, err: &dyn std::fmt::Display) {
        crate::debug!("render"; "{} reader failed: {}", pipe, err);
        self.entries
            .lock()
            .push(LogEntry::error(format!("{pipe} reader failed: {err}")));
    }

    fn take_entries(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl Drop for ChildIo {
    fn drop(&mut self) {
        if let Some(handle) = self.stdin.take() {
            handle.abort();
        }
        if let Some(handle) = self.stdout.take() {
            handle.abort();
        }
        if let Some(handle) = self.stderr.take() {
            handle.abort();
        }
    }
}

/// Parse stderr line by line, publishing each entry as it arrives.
async fn read_diagnostics(
    pipe: ChildStderr,
    sink: DiagnosticSink,
    entries: Arc<Mutex<Vec<LogEntry>>>,
) {
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Err(e) => {
                entries
                    .lock()
                    .push(LogEntry::error(format!("diagnostic reader failed: {e}")));
                break;
            }
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                if line.trim().is_empty() {
                    continue;
                }
                let entry = parse_line(&line, &sink.source);
                // No subscribers is fine
                let _ = sink.live.send(LiveDiagnostic {
                    generation: sink.generation,
                    entry: entry.clone(),
                });
                entries.lock().push(entry);
            }
        }
    }
}
