//! `[pipeline]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [pipeline]
//! debounce_ms = 300   # quiet period before an edit burst is rendered
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Request scheduling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub debounce_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl PipelineConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// A debounce window as long as the render timeout would starve the preview.
    pub fn validate(&self, timeout_ms: u64, diag: &mut ConfigDiagnostics) {
        if self.debounce_ms >= timeout_ms {
            diag.error_with_hint(
                FieldPath::new("pipeline.debounce_ms"),
                format!(
                    "debounce ({}ms) must be shorter than the renderer timeout ({}ms)",
                    self.debounce_ms, timeout_ms
                ),
                "typical values are 100-500ms",
            );
        }
    }
}
