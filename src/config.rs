use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub top_performers: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { top_performers: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub csv_separator: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_separator: "; ".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub export: ExportConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Loads from `path`, `CHANNEL_INTEL_CONFIG` or `config/channel-intel.toml`
    /// in that order. A missing file yields defaults; env overrides apply
    /// last.
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "loading config");
                Self::from_file(path)?
            }
            _ => AppConfig::default(),
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("failed to read {}: {}", path.display(), err)))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| Error::Config(format!("failed to parse config: {}", err)))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| Error::Config(format!("failed to serialize config: {}", err)))?;
        std::fs::write(path, payload)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("CHANNEL_INTEL_TOP_PERFORMERS") {
            match value.trim().parse::<usize>() {
                Ok(count) => self.analysis.top_performers = count,
                Err(_) => warn!(value = %value, "ignoring invalid CHANNEL_INTEL_TOP_PERFORMERS"),
            }
        }
        if let Ok(separator) = env::var("CHANNEL_INTEL_CSV_SEPARATOR") {
            if !separator.is_empty() {
                self.export.csv_separator = separator;
            }
        }
        if let Ok(host) = env::var("CHANNEL_INTEL_HOST") {
            if !host.trim().is_empty() {
                self.server.host = host.trim().to_string();
            }
        }
        if let Ok(port) = env::var("CHANNEL_INTEL_PORT") {
            match port.trim().parse::<u16>() {
                Ok(value) => self.server.port = value,
                Err(_) => warn!(value = %port, "ignoring invalid CHANNEL_INTEL_PORT"),
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("CHANNEL_INTEL_CONFIG")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/channel-intel.toml")))
}
