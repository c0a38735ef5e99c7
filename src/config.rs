// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{APP_DIR_NAME, acquisition, decoding};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE_NAME: &str = "config.json";

/// User configuration, stored as JSON in the platform config directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External camera program and its arguments; `{output}` receives the staging path
    pub camera_command: Vec<String>,
    /// Filter handed to the file picker
    pub mime_filter: String,
    /// Longer image side is scaled down to this before detection (0 disables)
    pub max_dimension: u32,
    /// Drop results of a cycle that was superseded by a newer one
    pub discard_stale_cycles: bool,
    /// Override for the private staging directory
    pub staging_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_command: acquisition::DEFAULT_CAMERA_COMMAND
                .iter()
                .map(|s| s.to_string())
                .collect(),
            mime_filter: acquisition::DEFAULT_MIME_FILTER.to_string(),
            max_dimension: decoding::DEFAULT_MAX_DIMENSION,
            discard_stale_cycles: true,
            staging_dir: None,
        }
    }
}

impl Config {
    /// Default location: `<config_dir>/qrscan/config.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Read a config file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config = serde_json::from_str(&contents)?;
                debug!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from the default location, falling back to defaults on any error
    pub fn load() -> Self {
        let result = Self::default_path().and_then(|path| Self::load_from(&path));
        result.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load configuration, using defaults");
            Self::default()
        })
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Camera command line for a capture written to `output`
    pub fn camera_invocation(&self, output: &Path) -> Option<(String, Vec<String>)> {
        crate::backends::capture::command_line(&self.camera_command, output)
    }
}
