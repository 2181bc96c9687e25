use crate::{format::OutputFormat, storage::StorageError};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::trace;

pub const DEFAULT_APPLICATION_ID: &str = "pb";
pub const CONFIG_DIR_ENV: &str = "PB_CONFIG_DIR";
pub const GLOBAL_CONFIG_RECORD: &str = "config";
pub const DEFAULT_PAGINATION_SIZE: u32 = 30;

/// Resolves the configuration root.
///
/// `PB_CONFIG_DIR` wins when set, otherwise `<platform config dir>/pb`.
pub fn default_configuration_directory() -> Result<PathBuf, StorageError> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            trace!("Using configuration directory from {}", CONFIG_DIR_ENV);
            return Ok(PathBuf::from(dir));
        }
    }

    match config_dir() {
        Some(mut dir) => {
            dir.push(DEFAULT_APPLICATION_ID);
            Ok(dir)
        }
        None => Err(StorageError::ConfigDirectoryNotFound),
    }
}

/// Process-wide preferences persisted as `config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub active_context: String,
    pub output_format: OutputFormat,
    pub colors_enabled: bool,
    pub pagination_size: u32,
    pub debug: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            active_context: String::new(),
            output_format: OutputFormat::Json,
            colors_enabled: true,
            pagination_size: DEFAULT_PAGINATION_SIZE,
            debug: false,
        }
    }
}

/// Values given on the command line for a single invocation.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output_format: Option<OutputFormat>,
    pub colors_enabled: Option<bool>,
    pub debug: bool,
}

impl GlobalConfig {
    pub fn has_active_context(&self) -> bool {
        !self.active_context.is_empty()
    }

    /// Applies command-line overrides. The result is never persisted by callers.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(format) = overrides.output_format {
            self.output_format = format;
        }
        if let Some(colors) = overrides.colors_enabled {
            self.colors_enabled = colors;
        }
        if overrides.debug {
            self.debug = true;
        }
        if self.pagination_size == 0 {
            self.pagination_size = DEFAULT_PAGINATION_SIZE;
        }
        self
    }
}
