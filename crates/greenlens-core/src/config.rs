//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, the token storage backend, and the last
//! email used to sign in.
//!
//! Configuration is stored at `~/.config/greenlens/config.json`. The
//! `GREENLENS_API_URL` and `GREENLENS_TOKEN_BACKEND` environment variables
//! override the file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::Backend;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "greenlens";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API host used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5101";

pub const API_URL_ENV: &str = "GREENLENS_API_URL";
pub const TOKEN_BACKEND_ENV: &str = "GREENLENS_TOKEN_BACKEND";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not find {0} directory")]
    NoDirectory(&'static str),

    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is invalid: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub token_backend: Backend,
    #[serde(default)]
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoDirectory("config"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the log file and the file token store.
    pub fn cache_dir() -> Result<PathBuf, ConfigError> {
        let cache_dir = dirs::cache_dir().ok_or(ConfigError::NoDirectory("cache"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Base URL with env override: env var, then config file, then default.
    pub fn api_base_url(&self) -> String {
        Self::pick_base_url(std::env::var(API_URL_ENV).ok(), self.api_base_url.as_deref())
    }

    /// Token backend with env override.
    pub fn token_backend(&self) -> Backend {
        std::env::var(TOKEN_BACKEND_ENV)
            .ok()
            .and_then(|v| Backend::parse(&v))
            .unwrap_or(self.token_backend)
    }

    fn pick_base_url(env: Option<String>, configured: Option<&str>) -> String {
        env.filter(|v| !v.trim().is_empty())
            .or_else(|| {
                configured
                    .filter(|v| !v.trim().is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }
}
