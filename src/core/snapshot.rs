//! Immutable document snapshots handed to the pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RenderSettings;

/// Where a document came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// A file on disk.
    Path(PathBuf),
    /// An unsaved document (e.g. `Untitled-1`).
    Synthetic(String),
}

impl SourceId {
    /// Short name for status lines: the file name, or the synthetic id.
    pub fn display_name(&self) -> String {
        match self {
            Self::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Synthetic(id) => id.clone(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Synthetic(_) => None,
        }
    }

    /// File extension to give a transient copy of this document.
    pub fn extension(&self) -> &str {
        self.path()
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .unwrap_or("cho")
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Synthetic(id) => f.write_str(id),
        }
    }
}

/// Text, settings and origin of a document at one instant.
///
/// Cheap to clone; the text and settings are shared.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub text: Arc<str>,
    pub settings: Arc<RenderSettings>,
    pub source: SourceId,
}

impl DocumentSnapshot {
    pub fn new(text: impl Into<Arc<str>>, settings: Arc<RenderSettings>, source: SourceId) -> Self {
        Self {
            text: text.into(),
            settings,
            source,
        }
    }

    /// Same document with different settings.
    pub fn with_settings(&self, settings: Arc<RenderSettings>) -> Self {
        Self {
            text: Arc::clone(&self.text),
            settings,
            source: self.source.clone(),
        }
    }
}
