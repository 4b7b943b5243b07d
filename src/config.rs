//! Configuration loading and management
//!
//! Settings come from an optional `harmony.toml` in the working directory;
//! a missing file means defaults. The API base URL can also be overridden
//! through the environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_BASE_URL;
use crate::error::{Error, Result};
use crate::repository::DEFAULT_STORAGE_KEY;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "harmony.toml";

/// Environment variable overriding the API base URL.
pub const API_BASE_URL_ENV: &str = "HARMONY_API_BASE_URL";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storage key (file name) for the local task collection
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            api: ApiConfig::default(),
        }
    }
}

fn default_storage_path() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the remote task service
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Config {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw).map_err(|err| Error::InvalidConfig(err.to_string()))?
        } else {
            Config::default()
        };

        if let Ok(base_url) = std::env::var(API_BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                config.api.base_url = base_url;
            }
        }

        Ok(config)
    }
}
