use anyhow::{Context, Result};
use clap::ValueEnum;
use pixmeta_common::validate::{ALLOWED_EXTENSIONS, MAX_FILES};
use pixmeta_common::BatchPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::cli::OutputMode;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Largest batch accepted in one run
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Extensions accepted by batch validation
    #[serde(default = "default_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Number of parallel jobs for batch operations (0 = auto-detect)
    #[serde(default = "default_jobs")]
    pub parallel_jobs: usize,

    /// Show progress bars
    #[serde(default = "default_progress")]
    pub show_progress: bool,

    /// Colored output
    #[serde(default = "default_color")]
    pub colored_output: bool,

    /// "table" or "json"
    #[serde(default = "default_output")]
    pub output: String,
}

fn default_max_files() -> usize {
    MAX_FILES
}

fn default_extensions() -> Vec<String> {
    ALLOWED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

fn default_jobs() -> usize {
    0
}

fn default_progress() -> bool {
    true
}

fn default_color() -> bool {
    true
}

fn default_output() -> String {
    "table".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            allowed_extensions: default_extensions(),
            parallel_jobs: default_jobs(),
            show_progress: default_progress(),
            colored_output: default_color(),
            output: default_output(),
        }
    }
}

impl Config {
    /// Get config file path (XDG-compliant)
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = directories::ProjectDirs::from("", "", "pixmeta")
            .context("Failed to determine config directory")?
            .config_dir()
            .to_path_buf();

        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path).context("Failed to read config file")?;

            let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

            tracing::debug!("Loaded config from {:?}", config_path);
            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            tracing::info!("Created default config at {:?}", config_path);
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content).context("Failed to write config file")?;

        tracing::debug!("Saved config to {:?}", config_path);
        Ok(())
    }

    /// Reset to defaults
    pub fn reset() -> Result<()> {
        let config = Self::default();
        config.save()
    }

    /// Update one key from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "max_files" => self.max_files = value.parse()?,
            "allowed_extensions" => {
                self.allowed_extensions = value
                    .split(',')
                    .map(|ext| ext.trim().to_string())
                    .filter(|ext| !ext.is_empty())
                    .collect()
            }
            "parallel_jobs" => self.parallel_jobs = value.parse()?,
            "show_progress" => self.show_progress = value.parse()?,
            "colored_output" => self.colored_output = value.parse()?,
            "output" => {
                Self::parse_output(value)?;
                self.output = value.to_lowercase();
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    pub fn output_mode(&self) -> Result<OutputMode> {
        Self::parse_output(&self.output)
    }

    fn parse_output(value: &str) -> Result<OutputMode> {
        OutputMode::from_str(value, true)
            .map_err(|_| anyhow::anyhow!("Invalid output: {}. Use table or json", value))
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy::new(self.max_files, self.allowed_extensions.clone())
    }
}
