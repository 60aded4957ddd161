//! Renderer input: a transient copy of the document, or stdin.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;

use super::RenderError;
use crate::config::InputMode;
use crate::core::DocumentSnapshot;

/// Input for one render. The transient file is removed when this is dropped,
/// whichever way the render ends.
pub(super) enum RenderInput {
    File(NamedTempFile),
    Stdin(Arc<str>),
}

impl RenderInput {
    pub(super) fn prepare(snapshot: &DocumentSnapshot, mode: InputMode) -> Result<Self, RenderError> {
        match mode {
            InputMode::Stdin => Ok(Self::Stdin(Arc::clone(&snapshot.text))),
            InputMode::File => {
                let suffix = format!(".{}", snapshot.source.extension());
                let mut file = tempfile::Builder::new()
                    .prefix(".preview-")
                    .suffix(&suffix)
                    .tempfile()
                    .map_err(RenderError::Input)?;
                file.write_all(snapshot.text.as_bytes())
                    .and_then(|()| file.flush())
                    .map_err(RenderError::Input)?;
                Ok(Self::File(file))
            }
        }
    }

    /// Input argument as passed to the renderer.
    pub(super) fn argument(&self) -> String {
        match self {
            Self::File(file) => file.path().display().to_string(),
            Self::Stdin(_) => "-".to_string(),
        }
    }

    /// Name the renderer uses for this input in its diagnostics.
    pub(super) fn source_name(&self) -> String {
        self.argument()
    }

    pub(super) fn stdin_text(&self) -> Option<Arc<str>> {
        match self {
            Self::File(_) => None,
            Self::Stdin(text) => Some(Arc::clone(text)),
        }
    }

    #[cfg(test)]
    pub(super) fn path(&self) -> Option<&Path> {
        match self {
            Self::File(file) => Some(file.path()),
            Self::Stdin(_) => None,
        }
    }
}
