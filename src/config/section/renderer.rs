//! `[renderer]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [renderer]
//! command = ["chordpro"]            # program plus leading arguments
//! info_args = ["-A", "-A", "-A"]    # runtime info query (JSON)
//! input = "file"                    # "file" (transient copy) or "stdin"
//! timeout_ms = 20000                # hard ceiling per render
//! grace_ms = 500                    # SIGTERM -> SIGKILL escalation delay
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// How the document text reaches the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Written to a transient file whose path is the last argument.
    #[default]
    File,
    /// Piped through standard input; the last argument is `-`.
    Stdin,
}

/// External renderer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Program and leading arguments.
    pub command: Vec<String>,

    /// Arguments for the runtime info query.
    pub info_args: Vec<String>,

    pub input: InputMode,

    /// Execution ceiling in milliseconds. Not reset by output activity.
    pub timeout_ms: u64,

    /// Delay between graceful and forceful termination.
    pub grace_ms: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: vec!["chordpro".into()],
            info_args: vec!["-A".into(), "-A".into(), "-A".into()],
            input: InputMode::File,
            timeout_ms: 20_000,
            grace_ms: 500,
        }
    }
}

impl RendererConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub const fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    /// The program (first word of `command`).
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.command.iter().all(|w| w.trim().is_empty()) {
            diag.error_with_hint(
                FieldPath::new("renderer.command"),
                "renderer command is empty",
                "set it to the chordpro executable, e.g. [\"chordpro\"]",
            );
        }
        if self.timeout_ms == 0 {
            diag.error(
                FieldPath::new("renderer.timeout_ms"),
                "timeout must be greater than zero",
            );
        }
    }
}
