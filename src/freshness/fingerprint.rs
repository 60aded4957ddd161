//! Render fingerprints.
//!
//! Two snapshots with equal fingerprints render to the same artifact, so the
//! scheduler only issues a request when the fingerprint moves.

use super::ContentHash;
use crate::core::{DocumentSnapshot, PaneMode};
use crate::renderer::settings_args;

/// Comparable identity of (text, render settings, pane mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub text: ContentHash,
    /// Hash of the arguments the settings turn into.
    pub settings: ContentHash,
    pub pane: PaneMode,
}

/// Derive the fingerprint of a snapshot shown in `pane`.
pub fn fingerprint(snapshot: &DocumentSnapshot, pane: PaneMode) -> Fingerprint {
    Fingerprint {
        text: ContentHash::of(snapshot.text.as_bytes()),
        settings: ContentHash::of_parts(settings_args(&snapshot.settings)),
        pane,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::config::RenderSettings;
    use crate::core::SourceId;

    fn snapshot(text: &str, settings: RenderSettings) -> DocumentSnapshot {
        DocumentSnapshot::new(
            text,
            Arc::new(settings),
            SourceId::Path(PathBuf::from("/songs/song.cho")),
        )
    }

    #[test]
    fn test_identical_inputs_match() {
        let a = snapshot("{title: Hallelujah}\n[C]I heard", RenderSettings::default());
        let b = snapshot("{title: Hallelujah}\n[C]I heard", RenderSettings::default());
        assert_eq!(
            fingerprint(&a, PaneMode::EditorAndPreview),
            fingerprint(&b, PaneMode::EditorAndPreview)
        );
    }

    #[test]
    fn test_text_change_moves_fingerprint() {
        let a = snapshot("[C]I heard", RenderSettings::default());
        let b = snapshot("[C]I heard ", RenderSettings::default());
        assert_ne!(
            fingerprint(&a, PaneMode::PreviewOnly),
            fingerprint(&b, PaneMode::PreviewOnly)
        );
    }

    #[test]
    fn test_pane_change_moves_fingerprint() {
        let a = snapshot("[C]I heard", RenderSettings::default());
        assert_ne!(
            fingerprint(&a, PaneMode::EditorOnly),
            fingerprint(&a, PaneMode::PreviewOnly)
        );
    }

    #[test]
    fn test_settings_change_moves_fingerprint() {
        let a = snapshot("[C]I heard", RenderSettings::default());
        let b = snapshot(
            "[C]I heard",
            RenderSettings {
                transpose: 3,
                ..RenderSettings::default()
            },
        );
        assert_ne!(
            fingerprint(&a, PaneMode::PreviewOnly).settings,
            fingerprint(&b, PaneMode::PreviewOnly).settings
        );
    }

    #[test]
    fn test_define_order_is_irrelevant() {
        let mut first = BTreeMap::new();
        first.insert("a".to_string(), "1".to_string());
        first.insert("b".to_string(), "2".to_string());
        let mut second = BTreeMap::new();
        second.insert("b".to_string(), "2".to_string());
        second.insert("a".to_string(), "1".to_string());

        let a = snapshot("x", RenderSettings { defines: first, ..RenderSettings::default() });
        let b = snapshot("x", RenderSettings { defines: second, ..RenderSettings::default() });
        assert_eq!(
            fingerprint(&a, PaneMode::PreviewOnly),
            fingerprint(&b, PaneMode::PreviewOnly)
        );
    }
}
