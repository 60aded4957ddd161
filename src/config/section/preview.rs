//! `[preview]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [preview]
//! pane = "editor-and-preview"   # "editor-only" disables rendering
//! output = "build/song.pdf"     # default: next to the song, with .pdf extension
//! log = "build/song.log"        # export the log after every render
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::PaneMode;

/// Where the watch command puts its results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub pane: PaneMode,
    pub output: Option<PathBuf>,
    pub log: Option<PathBuf>,
}

impl PreviewConfig {
    /// Output artifact path for `song`.
    pub fn output_for(&self, song: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| song.with_extension("pdf"))
    }
}
