//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use clap::builder::FalseyValueParser;
use clap::Args;
use thiserror::Error;

use crate::config::schema::LookupConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Environment / command-line overrides layered on top of the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Optional TOML config file.
    #[arg(long = "config", env = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Listening port.
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Interface to bind.
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Default source file.
    #[arg(long, env = "CSV_PATH")]
    pub csv_path: Option<PathBuf>,

    /// Root for relative source paths.
    #[arg(long, env = "DATA_ROOT")]
    pub data_root: Option<PathBuf>,

    /// Shared secret for POST endpoints; empty disables auth.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Reload when the source file changes.
    #[arg(
        long,
        env = "WATCH_SOURCE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = FalseyValueParser::new()
    )]
    pub watch: Option<bool>,
}

impl ConfigOverrides {
    /// Apply every override that was given.
    pub fn apply(&self, config: &mut LookupConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(host) = &self.host {
            config.listener.host = host.clone();
        }
        if let Some(path) = &self.csv_path {
            config.source.path = path.clone();
        }
        if let Some(root) = &self.data_root {
            config.source.root = root.clone();
        }
        if let Some(key) = &self.api_key {
            config.auth.api_key = key.trim().to_string();
        }
        if let Some(watch) = self.watch {
            config.source.watch = watch;
        }
    }
}

/// Read and deserialize a TOML config file. Validation runs after overrides.
pub fn load_config(path: &Path) -> Result<LookupConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the effective configuration: file (or defaults), then overrides, then validation.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<LookupConfig, ConfigError> {
    let mut config = match &overrides.config_file {
        Some(path) => load_config(path)?,
        None => LookupConfig::default(),
    };

    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
