use std::io;

use thiserror::Error;

use crate::diagnostic::LogEntry;

/// Failures that prevent a render from producing a result of its own.
///
/// These never leave the pipeline: each becomes a single error entry in the
/// scene log.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer command is empty")]
    EmptyCommand,

    #[error("renderer `{program}` not found: {source}")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to prepare renderer input: {0}")]
    Input(#[source] io::Error),

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for renderer: {0}")]
    Wait(#[source] io::Error),
}

impl RenderError {
    pub fn to_entry(&self) -> LogEntry {
        LogEntry::error(self.to_string())
    }
}
