//! Configuration management for the Gunk language server.
//!
//! Handles:
//! - Command-line argument parsing
//! - User-global and project settings files
//! - Client `initializationOptions`
//!
//! Later layers win: defaults, user file, project file, client options,
//! command line.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::graph::fs::{DEFAULT_EXTENSION, DEFAULT_SKIP_DIRS};

/// Settings file looked up at the workspace root
pub const PROJECT_CONFIG_FILE: &str = ".gunkls.toml";

/// Command-line arguments for the Gunk language server
#[derive(Debug, Parser)]
#[command(name = "gunkls")]
#[command(about = "Language server for Gunk packages")]
#[command(version)]
pub struct Args {
    /// Append lint findings to packages without hard errors
    #[arg(long, help = "Enable lint diagnostics")]
    pub lint: bool,

    /// Lint tool invocation, split on whitespace
    #[arg(
        long,
        help = "Lint command; `{file}` is replaced by the file path and its text is sent on stdin"
    )]
    pub lint_command: Option<String>,

    /// Source file extension
    #[arg(long, help = "Extension of source files (default: gunk)")]
    pub extension: Option<String>,

    /// Log level for the language server
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// One layer of settings; unset keys leave lower layers alone.
///
/// Read from TOML files (snake_case keys) and from LSP initialization
/// options (camelCase keys accepted too).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub lint: Option<bool>,
    #[serde(alias = "lintCommand")]
    pub lint_command: Option<Vec<String>>,
    pub extension: Option<String>,
    #[serde(alias = "skipDirs")]
    pub skip_dirs: Option<Vec<String>>,
}

impl Settings {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing settings in {}", path.display()))
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).context("parsing initialization options")
    }

    fn from_args(args: &Args) -> Self {
        Self {
            // A bare flag can only switch lint on.
            lint: args.lint.then_some(true),
            lint_command: args
                .lint_command
                .as_deref()
                .map(|cmd| cmd.split_whitespace().map(str::to_string).collect()),
            extension: args.extension.clone(),
            skip_dirs: None,
        }
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub lint: bool,
    pub lint_command: Vec<String>,
    pub extension: String,
    pub skip_dirs: Vec<String>,
    /// Log level
    pub log_level: String,
    /// Settings files that were applied, lowest precedence first
    pub sources: Vec<PathBuf>,
    client: Settings,
    cli: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lint: false,
            lint_command: Vec::new(),
            extension: DEFAULT_EXTENSION.to_string(),
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            log_level: "info".to_string(),
            sources: Vec::new(),
            client: Settings::default(),
            cli: Settings::default(),
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        Self::from_args_with_user_file(args, user_config_path().as_deref())
    }

    /// Like `from_args`, with an explicit user settings file
    pub fn from_args_with_user_file(args: Args, user_file: Option<&Path>) -> Result<Self> {
        let mut config = Config {
            log_level: args.log_level.clone(),
            cli: Settings::from_args(&args),
            ..Config::default()
        };

        if let Some(path) = user_file {
            if path.is_file() {
                config.apply(Settings::from_toml_file(path)?);
                config.sources.push(path.to_path_buf());
            }
        }

        config.apply(config.cli.clone());
        Ok(config)
    }

    /// Layer the project's `.gunkls.toml`, if any. Client options and
    /// command-line values still win.
    pub fn load_project(&mut self, root: &Path) -> Result<Option<PathBuf>> {
        let path = root.join(PROJECT_CONFIG_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        self.apply(Settings::from_toml_file(&path)?);
        self.apply(self.client.clone());
        self.apply(self.cli.clone());
        self.sources.push(path.clone());
        Ok(Some(path))
    }

    /// Layer client initialization options. Command-line values still win.
    pub fn apply_client_options(&mut self, settings: Settings) {
        self.client = settings.clone();
        self.apply(settings);
        self.apply(self.cli.clone());
    }

    /// Overwrite every key `settings` sets.
    pub fn apply(&mut self, settings: Settings) {
        if let Some(lint) = settings.lint {
            self.lint = lint;
        }
        if let Some(command) = settings.lint_command {
            self.lint_command = command;
        }
        if let Some(extension) = settings.extension {
            self.extension = extension.trim_start_matches('.').to_string();
        }
        if let Some(skip_dirs) = settings.skip_dirs {
            self.skip_dirs = skip_dirs;
        }
    }
}

/// `<config dir>/gunkls/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gunkls").join("config.toml"))
}
