//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod types;

pub use types::{LoggingConfig, PointerConfig, QueueConfig, LOG_FORMATS, LOG_LEVELS};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Event queue configuration
    #[serde(default)]
    pub queue: QueueConfig,
    /// Pointer configuration
    #[serde(default)]
    pub pointer: PointerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;

        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Create default configuration (headless, windowed, 200-record queue)
    pub fn default_config() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.queue.capacity == 0 {
            anyhow::bail!("Queue capacity must be at least 1 record");
        }

        match (self.pointer.surface_width, self.pointer.surface_height) {
            (None, None) => {}
            (Some(width), Some(height)) => {
                if width <= 0 || height <= 0 {
                    anyhow::bail!("Invalid surface size: {}x{}", width, height);
                }
            }
            _ => anyhow::bail!("surface_width and surface_height must be set together"),
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, capacity: Option<usize>, grabbed: bool) -> Self {
        if let Some(capacity) = capacity {
            self.queue.capacity = capacity;
        }
        if grabbed {
            self.pointer.start_grabbed = true;
        }

        self
    }
}
