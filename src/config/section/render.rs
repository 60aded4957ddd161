//! `[render]` section configuration.
//!
//! Everything in this section changes the rendered PDF, so it takes part in
//! render fingerprints: editing it in `preview.toml` during `watch` triggers a
//! new render, editing anything else does not.
//!
//! # Example
//!
//! ```toml
//! [render]
//! paper = "letter"
//! transpose = -2
//! notation = "latin"
//! diagrams = false
//! configs = ["~/chordpro/band.json"]
//! task = "tasks/large-print.json"
//! extra_args = ["--single-space"]
//!
//! [render.defines]
//! "pdf.fonts.title.size" = "18"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::path::expand_path;

/// Settings relevant to rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Paper size name passed as `pdf.papersize`.
    pub paper: Option<String>,

    /// Semitones to transpose; zero leaves chords untouched.
    pub transpose: i32,

    /// Note naming system (e.g. `latin`, `german`).
    pub notation: Option<String>,

    /// Print chord diagrams.
    pub diagrams: bool,

    /// Additional renderer config files, applied in order.
    pub configs: Vec<PathBuf>,

    /// Custom task config, applied after `configs`.
    pub task: Option<PathBuf>,

    /// `--define` items; sorted by key when turned into arguments.
    pub defines: BTreeMap<String, String>,

    /// Passed through verbatim before the input argument.
    pub extra_args: Vec<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            paper: None,
            transpose: 0,
            notation: None,
            diagrams: true,
            configs: Vec::new(),
            task: None,
            defines: BTreeMap::new(),
            extra_args: Vec::new(),
        }
    }
}

impl RenderSettings {
    /// Resolve config and task paths against `root`.
    pub fn normalize(&mut self, root: &Path) {
        self.configs = self.configs.iter().map(|p| expand_path(p, root)).collect();
        if let Some(task) = self.task.take() {
            self.task = Some(expand_path(&task, root));
        }
    }

    /// Files read by the renderer besides the song: `configs`, then `task`.
    pub fn resource_files(&self) -> impl Iterator<Item = &Path> {
        self.configs
            .iter()
            .chain(self.task.iter())
            .map(PathBuf::as_path)
    }
}
