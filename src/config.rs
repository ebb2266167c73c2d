//! Configuration loading
//!
//! The config file lives at `<config dir>/ghostline/config.toml`. A missing
//! file means defaults; a broken file means defaults plus a warning for the
//! status line, so a typo never keeps the editor from starting.

pub mod keys;
pub mod types;

use std::path::{Path, PathBuf};

use crate::error::GhostlineError;

pub use keys::KeyBinding;
pub use types::{AiConfig, AiProviderType, AnthropicConfig, Config, OpenAiConfig, SuggestionConfig};

/// Result of loading the configuration
#[derive(Debug, Default)]
pub struct ConfigResult {
    pub config: Config,
    /// Set when the file existed but could not be used
    pub warning: Option<String>,
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ghostline").join("config.toml"))
}

/// Read and parse a config file
pub fn load_config_from(path: &Path) -> Result<Config, GhostlineError> {
    let content = std::fs::read_to_string(path).map_err(|source| GhostlineError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|e| GhostlineError::ConfigParse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

/// Load the configuration, falling back to defaults
///
/// `path` overrides the default location. A missing file at the default
/// location is not worth a warning; a missing explicit file is.
pub fn load_config(path: Option<&Path>) -> ConfigResult {
    let explicit = path.is_some();
    let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
        return ConfigResult::default();
    };

    if !explicit && !path.exists() {
        return ConfigResult::default();
    }

    match load_config_from(&path) {
        Ok(config) => {
            log::debug!("Loaded config from {}", path.display());
            ConfigResult {
                config,
                warning: None,
            }
        }
        Err(e) => {
            log::warn!("{}", e);
            ConfigResult {
                config: Config::default(),
                warning: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
