//! Configuration loader with multi-source merging

use crate::{ChrononConfig, Paths};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    env_vars: Option<config::Map<String, String>>,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "CHRONON".to_string(),
            env_vars: None,
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "CHRONON")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Read environment overrides from `vars` instead of the process environment
    pub fn with_env_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Configuration files that exist and would be merged, lowest precedence first
    pub fn sources(&self) -> Vec<PathBuf> {
        let mut files = Paths::new().layers(&self.project_dir);
        files.retain(|file| file.exists());
        files
    }

    /// Load configuration from all sources with proper precedence
    pub fn load(self) -> Result<ChrononConfig> {
        let mut builder = config::Config::builder();

        // 1. Start with built-in defaults
        let defaults = ChrononConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2-4. User config, chronon.toml, chronon.local.toml
        for file in self.sources() {
            builder = builder.add_source(
                config::File::from(file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 5. Environment variables (CHRONON_SIMULATOR__SCHEDULER=map)
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(self.env_vars),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let chronon_config: ChrononConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        chronon_config
            .validate()
            .context("Invalid configuration")?;

        Ok(chronon_config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default(self) -> ChrononConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
