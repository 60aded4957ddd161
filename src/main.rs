//! ChordPro Preview - live PDF preview for ChordPro songs.

#![allow(dead_code)]

mod actor;
mod cli;
mod config;
mod core;
mod diagnostic;
mod freshness;
mod logger;
mod renderer;
mod scene;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{ProjectConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    let shutdown_rx = core::setup_shutdown_handler()?;

    let cli = Arc::new(Cli::parse());

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = init_config(ProjectConfig::load(&cli)?);

    match &cli.command {
        Commands::Watch { file, .. } => {
            cli::watch::watch_song(file, Arc::clone(&cli), shutdown_rx)
        }
        Commands::Render { file, .. } => cli::render::render_song(file, &config, shutdown_rx),
        Commands::Info { directives, .. } => cli::info::show_info(&config, *directives),
    }
}
