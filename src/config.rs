use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::client::DEFAULT_ENDPOINT;
use crate::gate::RATE_LIMIT_DELAY;

pub const ENDPOINT_ENV: &str = "CITECHAT_ENDPOINT";

/// Persisted settings. Unset fields fall back to built-in defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub rate_limit_ms: Option<u64>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub rate_limit_ms: Option<u64>,
}

/// Effective settings after merging CLI, environment, file and defaults
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub rate_limit_ms: u64,
}

impl Settings {
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Config::new().resolve(&ConfigOverrides::default(), None)
    }
}

impl From<&Settings> for Config {
    fn from(settings: &Settings) -> Self {
        Self {
            endpoint: Some(settings.endpoint.clone()),
            rate_limit_ms: Some(settings.rate_limit_ms),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            rate_limit_ms: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {:?}: {}", path, e))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Precedence: command line, then `CITECHAT_ENDPOINT`, then file, then default
    pub fn resolve(&self, cli: &ConfigOverrides, env_endpoint: Option<String>) -> Settings {
        let endpoint = cli
            .endpoint
            .clone()
            .or(env_endpoint)
            .or_else(|| self.endpoint.clone())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let rate_limit_ms = cli
            .rate_limit_ms
            .or(self.rate_limit_ms)
            .unwrap_or(RATE_LIMIT_DELAY.as_millis() as u64);

        Settings {
            endpoint,
            rate_limit_ms,
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("citechat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_fixed_endpoint_and_delay() {
        let settings = Settings::default();
        assert_eq!(settings.endpoint, "http://localhost:5000/api/chat");
        assert_eq!(settings.rate_limit(), Duration::from_millis(1000));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            endpoint: Some("http://kb.internal:8080/api/chat".to_string()),
            rate_limit_ms: Some(250),
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let config = Config {
            endpoint: Some("http://file".to_string()),
            rate_limit_ms: Some(2000),
        };

        let settings = config.resolve(&ConfigOverrides::default(), None);
        assert_eq!(settings.endpoint, "http://file");
        assert_eq!(settings.rate_limit_ms, 2000);

        let settings = config.resolve(&ConfigOverrides::default(), Some("http://env".to_string()));
        assert_eq!(settings.endpoint, "http://env");

        let cli = ConfigOverrides {
            endpoint: Some("http://cli".to_string()),
            rate_limit_ms: Some(10),
        };
        let settings = config.resolve(&cli, Some("http://env".to_string()));
        assert_eq!(settings.endpoint, "http://cli");
        assert_eq!(settings.rate_limit_ms, 10);
    }

    #[test]
    fn resolved_settings_persist_and_reload_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let cli = ConfigOverrides {
            endpoint: Some("http://kb:9000/api/chat".to_string()),
            rate_limit_ms: None,
        };
        let settings = Config::new().resolve(&cli, None);

        Config::from(&settings).save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();

        assert_eq!(reloaded.endpoint.as_deref(), Some("http://kb:9000/api/chat"));
        assert_eq!(reloaded.rate_limit_ms, Some(1000));
        assert_eq!(reloaded.resolve(&ConfigOverrides::default(), None), settings);
    }

    #[test]
    fn blank_endpoint_falls_back_to_default() {
        let config = Config {
            endpoint: Some("   ".to_string()),
            rate_limit_ms: None,
        };
        let settings = config.resolve(&ConfigOverrides::default(), None);
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
    }
}
