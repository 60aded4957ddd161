//! Core types - pure values shared across the pipeline.

mod pane;
mod snapshot;
mod state;

pub use pane::PaneMode;
pub use snapshot::{DocumentSnapshot, SourceId};
pub use state::{is_shutdown, setup_shutdown_handler};
