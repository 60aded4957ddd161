//! Actor System for live preview
//!
//! Message-passing concurrency, one scheduler per scene:
//!
//! ```text
//! WatcherActor --SceneEvent--> Scheduler --Arc<SceneState>--> OutputActor
//!  (notify)                  (debounce,      (watch)          (pdf, status)
//!                             generations)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `scheduler` - Debouncing, generations, render dispatch
//! - `watcher` - Song and config file watcher
//! - `output` - Scene observer writing the artifact and status
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod messages;
pub mod output;
pub mod scheduler;
pub mod watcher;

pub use coordinator::Coordinator;
