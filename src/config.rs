//! Application configuration management.
//!
//! Non-secret settings are stored at `~/.config/scentdesk/config.json`
//! (currently the last used login email). The backend location and the
//! token storage key come from the environment so deployments can switch
//! backends without touching the file:
//!
//! - `SCENTDESK_API_URL`: base URL, trailing slash significant
//! - `SCENTDESK_TOKEN_KEY`: storage key the bearer token is filed under

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/state directory paths
const APP_NAME: &str = "scentdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Fallback API base URL for local development. Endpoints are joined onto
/// the base by concatenation, so the trailing slash matters.
const DEFAULT_API_URL: &str = "http://localhost:3000/";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Resolved API base URL: environment wins over the config file.
    pub fn api_url(&self) -> String {
        std::env::var("SCENTDESK_API_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Storage key the persisted bearer token is filed under. Empty when
    /// the deployment never set one; the token store refuses to construct
    /// in that case.
    pub fn token_key(&self) -> String {
        std::env::var("SCENTDESK_TOKEN_KEY").unwrap_or_default()
    }

    /// Directory holding mutable application state (the token file, logs).
    pub fn state_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
