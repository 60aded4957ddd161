//! External renderer invocation.
//!
//! ```text
//! RenderRequest ─► args (settings → argv) ─► process (spawn, stream, wait)
//!                                               │ stderr lines
//!                                               ▼
//!                              diagnostic::parse_line ─► live broadcast
//! ```
//!
//! # Module Structure
//!
//! - `args` - deterministic argument vector
//! - `input` - transient input file / stdin
//! - `process` - subprocess lifecycle with timeout and cancellation
//! - `terminate` - process group signalling
//! - `info` - runtime metadata query and directive list

mod args;
mod error;
mod info;
mod input;
mod process;
mod terminate;

#[cfg(test)]
mod tests;

pub use args::{build_args, settings_args};
pub use error::RenderError;
pub use info::{Directive, InfoError, RendererInfo, directives, query_info, renderer_info, runtime_report};
pub use process::ProcessRenderer;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::core::{DocumentSnapshot, PaneMode};
use crate::diagnostic::LogEntry;

/// Future returned by [`Renderer::render`].
pub type RenderFuture = Pin<Box<dyn Future<Output = RenderResult> + Send>>;

/// Turns render requests into results.
///
/// Implementations must resolve promptly once `cancel` fires, returning
/// [`RenderOutcome::Cancelled`].
pub trait Renderer: Send + Sync + 'static {
    fn render(&self, request: RenderRequest, cancel: CancellationToken) -> RenderFuture;

    /// Diagnostics as they arrive, before the render completes.
    fn live_diagnostics(&self) -> Option<broadcast::Receiver<LiveDiagnostic>> {
        None
    }
}

/// One accepted render request.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub generation: u64,
    pub snapshot: DocumentSnapshot,
    pub pane: PaneMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Complete artifact bytes.
    Success(Arc<[u8]>),
    /// `exit_code` is `None` when the renderer never exited on its own
    /// (spawn failure, timeout).
    Failed { exit_code: Option<i32> },
    Cancelled,
}

/// The answer to the request with the same generation.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub generation: u64,
    pub outcome: RenderOutcome,
    pub log: Vec<LogEntry>,
}

impl RenderResult {
    pub fn success(generation: u64, artifact: impl Into<Arc<[u8]>>, log: Vec<LogEntry>) -> Self {
        Self {
            generation,
            outcome: RenderOutcome::Success(artifact.into()),
            log,
        }
    }

    pub fn failed(generation: u64, exit_code: Option<i32>, log: Vec<LogEntry>) -> Self {
        Self {
            generation,
            outcome: RenderOutcome::Failed { exit_code },
            log,
        }
    }

    pub fn cancelled(generation: u64) -> Self {
        Self {
            generation,
            outcome: RenderOutcome::Cancelled,
            log: Vec::new(),
        }
    }
}

/// A diagnostic published while its render is still running.
#[derive(Debug, Clone)]
pub struct LiveDiagnostic {
    pub generation: u64,
    pub entry: LogEntry,
}
