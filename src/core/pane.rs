//! Pane layout of a document view.

use serde::{Deserialize, Serialize};

/// Which panes a document view shows.
///
/// Only matters to the pipeline in one way: a view without a preview pane
/// does not need renders.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PaneMode {
    EditorOnly,
    #[default]
    EditorAndPreview,
    PreviewOnly,
}

impl PaneMode {
    /// Whether this layout displays the rendered artifact.
    pub const fn shows_preview(self) -> bool {
        !matches!(self, Self::EditorOnly)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EditorOnly => "editor",
            Self::EditorAndPreview => "editor+preview",
            Self::PreviewOnly => "preview",
        }
    }
}
