//! Xmlbuf Configuration
//!
//! Handles parsing and management of xmlbuf.toml configuration files.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::buf::{BufPolicy, DetachPolicy, DEFAULT_GROWTH_HEADROOM, DEFAULT_MIN_CAPACITY, MAX_CAPACITY};

/// Name of the configuration file searched for by [`XmlBufConfig::find_and_load`].
pub const CONFIG_FILE_NAME: &str = "xmlbuf.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Global registry already initialized")]
    AlreadyInitialized,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching xmlbuf.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct XmlBufConfig {
    /// Sizing of buffer storage
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Detach behaviour
    #[serde(default)]
    pub detach: DetachConfig,
}

impl XmlBufConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: XmlBufConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                // Reached root without finding config
                return Ok(Self::default());
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the settings are consistent with each other.
    pub fn validate(&self) -> ConfigResult<()> {
        let max = self.buffer.max_capacity();
        if self.buffer.min_capacity > max {
            return Err(ConfigError::Invalid(format!(
                "min_capacity {} exceeds max_capacity {}",
                self.buffer.min_capacity, max
            )));
        }
        if max > MAX_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "max_capacity {} exceeds the largest supported capacity {}",
                max, MAX_CAPACITY
            )));
        }
        Ok(())
    }

    /// Buffer policy described by this configuration.
    pub fn policy(&self) -> BufPolicy {
        BufPolicy {
            min_capacity: self.buffer.min_capacity,
            growth_headroom: self.buffer.growth_headroom,
            max_capacity: self.buffer.max_capacity(),
            detach: self.detach.policy,
        }
    }
}

/// Buffer sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Capacity used for creation hints below this
    #[serde(default = "default_min_capacity")]
    pub min_capacity: usize,

    /// Extra bytes on a grow step that does not double
    #[serde(default = "default_growth_headroom")]
    pub growth_headroom: usize,

    /// Hard capacity limit; unlimited when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<usize>,
}

fn default_min_capacity() -> usize {
    DEFAULT_MIN_CAPACITY
}

fn default_growth_headroom() -> usize {
    DEFAULT_GROWTH_HEADROOM
}

impl BufferConfig {
    fn max_capacity(&self) -> usize {
        self.max_capacity.unwrap_or(MAX_CAPACITY)
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            min_capacity: default_min_capacity(),
            growth_headroom: default_growth_headroom(),
            max_capacity: None,
        }
    }
}

/// Detach settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetachConfig {
    /// What detaching an empty buffer does
    #[serde(default)]
    pub policy: DetachPolicy,
}
