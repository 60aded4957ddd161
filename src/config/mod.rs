//! Project configuration management for `preview.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── renderer   # [renderer]
//! │   ├── pipeline   # [pipeline]
//! │   ├── render     # [render]
//! │   └── preview    # [preview]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── field      # FieldPath
//! │   └── handle     # Global config handle
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! The config file is optional: without one every section uses its defaults.

pub mod section;
pub mod types;

pub use section::{InputMode, PipelineConfig, PreviewConfig, RenderSettings, RendererConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config, reload_config};

use crate::cli::{Cli, Commands, PipelineArgs};
use crate::log;
use crate::utils::path::{find_upward, normalize_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing preview.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Absolute path to the config file, existing or not (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory relative paths are resolved against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// External renderer
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Request scheduling
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Settings that change the rendered output
    #[serde(default)]
    pub render: RenderSettings,

    /// Watch-mode destinations
    #[serde(default)]
    pub preview: PreviewConfig,
}

impl ProjectConfig {
    /// Load configuration for the given CLI invocation.
    ///
    /// Searches upward from cwd for the config file. A missing file is not an
    /// error; defaults apply and the root is the current directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_upward(&cli.config, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = normalize_path(&path);
                config
            }
            None => Self {
                config_path: cwd.join(&cli.config),
                ..Self::default()
            },
        };

        config.root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);
        config.finalize(cli);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Resolve paths and apply command-line overrides.
    fn finalize(&mut self, cli: &Cli) {
        let root = self.root.clone();
        self.render.normalize(&root);
        self.preview.output = self
            .preview
            .output
            .take()
            .map(|p| crate::utils::path::expand_path(&p, &root));
        self.preview.log = self
            .preview
            .log
            .take()
            .map(|p| crate::utils::path::expand_path(&p, &root));

        self.apply_command_options(cli);
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Watch {
                args,
                output,
                log,
                pane,
                debounce,
                ..
            } => {
                self.apply_pipeline_args(args);
                Self::update_option(&mut self.preview.pane, pane.as_ref());
                Self::update_option(&mut self.pipeline.debounce_ms, debounce.as_ref());
                if output.is_some() {
                    self.preview.output = output.clone();
                }
                if log.is_some() {
                    self.preview.log = log.clone();
                }
            }
            Commands::Render { args, output, .. } => {
                self.apply_pipeline_args(args);
                if output.is_some() {
                    self.preview.output = output.clone();
                }
            }
            Commands::Info { args, .. } => {
                self.apply_pipeline_args(args);
            }
        }
    }

    /// Apply renderer overrides shared by all commands.
    fn apply_pipeline_args(&mut self, args: &PipelineArgs) {
        if let Some(renderer) = &args.renderer {
            self.renderer.command = vec![renderer.to_string_lossy().into_owned()];
        }
        Self::update_option(&mut self.renderer.timeout_ms, args.timeout.as_ref());
        Self::update_option(&mut self.render.transpose, args.transpose.as_ref());
        if args.stdin {
            self.renderer.input = InputMode::Stdin;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting all errors at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.renderer.validate(&mut diag);
        self.pipeline
            .validate(self.renderer.timeout_ms, &mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse a config snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) =
            ProjectConfig::parse_with_ignored("[renderer]\ncomand = [\"x\"]\n").unwrap();
        assert_eq!(ignored, vec!["renderer.comand".to_string()]);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(ProjectConfig::parse_with_ignored("[renderer\n").is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "chordpro-preview",
            "watch",
            "song.cho",
            "--renderer",
            "/opt/chordpro/bin/chordpro",
            "--timeout",
            "5000",
            "--debounce",
            "120",
            "--stdin",
            "--pane",
            "preview-only",
        ]);
        let mut config = test_parse_config("");
        config.apply_command_options(&cli);

        assert_eq!(
            config.renderer.command,
            vec!["/opt/chordpro/bin/chordpro".to_string()]
        );
        assert_eq!(config.renderer.timeout_ms, 5000);
        assert_eq!(config.pipeline.debounce_ms, 120);
        assert_eq!(config.renderer.input, InputMode::Stdin);
        assert_eq!(config.preview.pane, crate::core::PaneMode::PreviewOnly);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_all_errors() {
        let mut config = test_parse_config(
            "[renderer]\ncommand = []\ntimeout_ms = 100\n[pipeline]\ndebounce_ms = 100",
        );
        config.root = PathBuf::from("/");
        let err = config.validate().unwrap_err();
        let diag = match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::Diagnostics(diag)) => diag,
            other => panic!("unexpected error: {other:?}"),
        };
        assert_eq!(diag.len(), 2);
    }

    #[test]
    fn test_load_finds_config_upward() {
        let temp = tempfile::TempDir::new().unwrap();
        let nested = temp.path().join("setlist");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            temp.path().join("preview.toml"),
            "[render]\nconfigs = [\"band.json\"]\n",
        )
        .unwrap();

        let found = find_upward(Path::new("preview.toml"), &nested).unwrap();
        let mut config = ProjectConfig::from_path(&found).unwrap();
        config.root = temp.path().to_path_buf();
        let cli = Cli::parse_from(["chordpro-preview", "render", "song.cho"]);
        config.finalize(&cli);

        assert_eq!(config.render.configs, vec![temp.path().join("band.json")]);
    }
}
