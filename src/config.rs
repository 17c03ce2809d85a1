use crate::client::DEFAULT_ENDPOINT;
use crate::theme::Theme;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    /// `None` means follow the terminal.
    pub theme: Option<Theme>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            theme: None,
            log_filter: "info".to_string(),
        }
    }
}

pub fn app_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    let dir = home.join(".qa-chat");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&app_dir()?.join("config.json"))
}

/// Read the config at `path`, writing the defaults there first if it is missing.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if path.exists() {
        let bytes = std::fs::read(path)?;
        let cfg: Config = serde_json::from_slice(&bytes)?;
        return Ok(cfg);
    }

    let default = Config::default();
    let json = serde_json::to_vec_pretty(&default)?;
    std::fs::write(path, json)?;
    Ok(default)
}
