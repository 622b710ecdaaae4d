//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::input::DEFAULT_QUEUE_CAPACITY;

/// Event queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum queued records before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
        }
    }
}

/// Pointer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointerConfig {
    /// Start in captured (grabbed) mode
    #[serde(default)]
    pub start_grabbed: bool,

    /// Virtual surface width in pixels (None = headless)
    #[serde(default)]
    pub surface_width: Option<i32>,

    /// Virtual surface height in pixels (None = headless)
    #[serde(default)]
    pub surface_height: Option<i32>,
}

impl PointerConfig {
    /// Surface size, when both dimensions are configured
    pub fn surface_size(&self) -> Option<(i32, i32)> {
        match (self.surface_width, self.surface_height) {
            (Some(width), Some(height)) => Some((width, height)),
            _ => None,
        }
    }
}

/// Accepted log levels
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Accepted log output formats
pub const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("pretty", "compact", "json")
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log file (None = console only)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_file: None,
        }
    }
}
