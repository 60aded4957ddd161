//! Actor Message Definitions
//!
//! ```text
//! Watcher / SceneHandle --SceneEvent--> Scheduler --watch--> observers
//! ```

use crate::core::{DocumentSnapshot, PaneMode};
use crate::diagnostic::LogEntry;

/// Messages to the scheduler actor of one scene.
#[derive(Debug)]
pub enum SceneEvent {
    /// Document text or settings changed
    Edit(DocumentSnapshot),
    /// Pane layout changed
    SetPane(PaneMode),
    /// Re-render the latest snapshot even if its fingerprint is unchanged
    Refresh,
    /// Empty the scene log
    ClearLog,
    /// Append a log entry outside a render cycle
    AppendNotice(LogEntry),
    /// Cancel any in-flight render and stop
    Shutdown,
}
