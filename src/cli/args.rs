//! Command-line interface definitions.

use crate::core::PaneMode;
use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Live PDF preview for ChordPro songs
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: preview.toml)
    #[arg(short = 'C', long, global = true, default_value = "preview.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Watch a song and re-render the preview on every change
    #[command(visible_alias = "w")]
    Watch {
        /// Song file to preview
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        #[command(flatten)]
        args: PipelineArgs,

        /// Preview PDF path (default: <song>.pdf)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Export the message log to this file after every render
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        log: Option<PathBuf>,

        /// Pane layout; `editor-only` suspends rendering
        #[arg(short, long, value_enum)]
        pane: Option<PaneMode>,

        /// Quiet period before a change is rendered, in milliseconds
        #[arg(short, long)]
        debounce: Option<u64>,
    },

    /// Render a song once and exit
    #[command(visible_alias = "r")]
    Render {
        /// Song file to render
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        #[command(flatten)]
        args: PipelineArgs,

        /// Output PDF path (default: <song>.pdf)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Show renderer version, resources and modules
    #[command(visible_alias = "i")]
    Info {
        #[command(flatten)]
        args: PipelineArgs,

        /// List the directives the renderer understands
        #[arg(short, long)]
        directives: bool,
    },
}

/// Renderer arguments shared by all commands
#[derive(clap::Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Renderer executable (replaces the configured command)
    #[arg(short, long, value_hint = clap::ValueHint::ExecutablePath)]
    pub renderer: Option<PathBuf>,

    /// Renderer timeout in milliseconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Pass the song on standard input instead of a temporary file
    #[arg(short = 'S', long)]
    pub stdin: bool,

    /// Transpose by this many semitones
    #[arg(short = 'x', long, allow_hyphen_values = true)]
    pub transpose: Option<i32>,
}

#[allow(unused)]
impl Cli {
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch { .. })
    }
    pub const fn is_render(&self) -> bool {
        matches!(self.command, Commands::Render { .. })
    }
    pub const fn is_info(&self) -> bool {
        matches!(self.command, Commands::Info { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_args() {
        let cli = Cli::parse_from(["chordpro-preview", "watch", "song.cho", "--pane", "editor-only"]);
        match cli.command {
            Commands::Watch { file, pane, .. } => {
                assert_eq!(file, PathBuf::from("song.cho"));
                assert_eq!(pane, Some(PaneMode::EditorOnly));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_negative_transpose() {
        let cli = Cli::parse_from(["chordpro-preview", "render", "song.cho", "--transpose", "-2"]);
        match cli.command {
            Commands::Render { args, .. } => assert_eq!(args.transpose, Some(-2)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["chordpro-preview", "info", "-v", "-C", "band.toml"]);
        assert!(cli.verbose);
        assert!(cli.is_info());
        assert_eq!(cli.config, PathBuf::from("band.toml"));
    }
}
