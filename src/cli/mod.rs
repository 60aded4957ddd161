//! Command-line interface module.

mod args;
pub mod info;
pub mod render;
pub mod watch;

pub use args::{Cli, Commands, PipelineArgs};
