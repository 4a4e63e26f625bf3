use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "https://api.billingo.hu/v3";
pub const API_KEY_ENV: &str = "BILLINGO_API_KEY";
pub const BASE_URL_ENV: &str = "BILLINGO_BASE_URL";

/// Resolved values handed to the HTTP client. Read once per command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfiguration {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl ClientConfiguration {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: base_url.into(),
        }
    }
}

/// Contents of the config file.
///
/// Both keys are optional on disk; missing ones fall back to the
/// environment and then to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Keys accepted by `config set/get/unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiKey,
    BaseUrl,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 2] = [ConfigKey::ApiKey, ConfigKey::BaseUrl];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ApiKey => "apiKey",
            ConfigKey::BaseUrl => "baseUrl",
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            ConfigKey::ApiKey => API_KEY_ENV,
            ConfigKey::BaseUrl => BASE_URL_ENV,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "apikey" => Ok(ConfigKey::ApiKey),
            "baseurl" => Ok(ConfigKey::BaseUrl),
            _ => Err(Error::ConfigFile(format!(
                "Unknown configuration key '{}'. Valid keys: apiKey, baseUrl",
                s
            ))),
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    ConfigFile,
    Environment,
    Default,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::ConfigFile => f.write_str("config file"),
            ValueSource::Environment => f.write_str("environment"),
            ValueSource::Default => f.write_str("default"),
        }
    }
}

impl StoredConfig {
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        let value = match key {
            ConfigKey::ApiKey => self.api_key.as_deref(),
            ConfigKey::BaseUrl => self.base_url.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: ConfigKey, value: Option<String>) {
        match key {
            ConfigKey::ApiKey => self.api_key = value,
            ConfigKey::BaseUrl => self.base_url = value,
        }
    }

    /// Resolve one key: stored value, then environment, then default.
    pub fn resolve_with<F>(&self, key: ConfigKey, env: F) -> Option<(String, ValueSource)>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = self.get(key) {
            return Some((value.to_string(), ValueSource::ConfigFile));
        }
        if let Some(value) = env(key.env_var()).filter(|v| !v.is_empty()) {
            return Some((value, ValueSource::Environment));
        }
        match key {
            ConfigKey::ApiKey => None,
            ConfigKey::BaseUrl => Some((DEFAULT_BASE_URL.to_string(), ValueSource::Default)),
        }
    }

    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_with(ConfigKey::ApiKey, process_env)
            .map(|(value, _)| value)
    }

    pub fn resolve_base_url(&self) -> String {
        self.resolve_with(ConfigKey::BaseUrl, process_env)
            .map(|(value, _)| value)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn client_configuration(&self) -> ClientConfiguration {
        ClientConfiguration {
            api_key: self.resolve_api_key(),
            base_url: self.resolve_base_url(),
        }
    }
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// TOML-backed key-value store for credentials.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the per-user default location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(default_config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored config. A missing file is an empty config.
    pub fn load(&self) -> Result<StoredConfig> {
        if !self.path.exists() {
            return Ok(StoredConfig::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        toml::from_str(&contents).map_err(|e| {
            Error::ConfigFile(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    pub fn save(&self, config: &StoredConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(config)
            .map_err(|e| Error::ConfigFile(format!("Failed to serialize config: {}", e)))?;
        fs::write(&self.path, contents)?;
        tracing::debug!(path = %self.path.display(), "saved configuration");
        Ok(())
    }

    pub fn set(&self, key: ConfigKey, value: &str) -> Result<()> {
        let mut config = self.load()?;
        config.set(key, Some(value.to_string()));
        self.save(&config)
    }

    pub fn unset(&self, key: ConfigKey) -> Result<()> {
        let mut config = self.load()?;
        config.set(key, None);
        self.save(&config)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| Error::ConfigFile("Could not determine config directory".to_string()))?;
    Ok(base.join("billingo-cli").join("config.toml"))
}
