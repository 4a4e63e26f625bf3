use super::Session;
use crate::output::{OutputFormat, mask_secret};
use anyhow::Result;
use billingo_core::config::ValueSource;
use billingo_core::{ConfigKey, StoredConfig};
use clap::Subcommand;
use serde_json::{Map, Value, json};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Set a configuration value (apiKey, baseUrl)
    Set {
        /// Configuration key
        key: ConfigKey,
        /// New value
        value: String,
    },

    /// Print the effective value of a key
    Get {
        /// Configuration key
        key: ConfigKey,
    },

    /// Remove a stored value
    Unset {
        /// Configuration key
        key: ConfigKey,
    },

    /// List all configuration
    List,

    /// Clear all stored configuration
    Clear,

    /// Print the configuration file path
    Path,
}

pub fn run(session: &Session, command: ConfigCommand) -> Result<()> {
    let store = &session.store;

    match command {
        ConfigCommand::Set { key, value } => {
            let value = value.trim();
            validate(key, value)?;
            store.set(key, value)?;
            let shown = match key {
                ConfigKey::ApiKey => mask_secret(value),
                ConfigKey::BaseUrl => value.to_string(),
            };
            eprintln!("✅ Configuration updated: {} = {}", key, shown);
            eprintln!("   Saved to: {}", store.path().display());
        }
        ConfigCommand::Get { key } => {
            let stored = store.load()?;
            match resolve(&stored, key) {
                Some((value, _)) => println!("{}", value),
                None => eprintln!("⚠️  Configuration key \"{}\" not found", key),
            }
        }
        ConfigCommand::Unset { key } => {
            store.unset(key)?;
            eprintln!("✅ Removed {} from {}", key, store.path().display());
        }
        ConfigCommand::List => {
            let stored = store.load()?;
            let path = store.path().display().to_string();
            list(session.format, &stored, &path);
        }
        ConfigCommand::Clear => {
            store.clear()?;
            eprintln!("✅ Configuration cleared");
        }
        ConfigCommand::Path => {
            println!("{}", store.path().display());
        }
    }

    Ok(())
}

fn resolve(stored: &StoredConfig, key: ConfigKey) -> Option<(String, ValueSource)> {
    stored.resolve_with(key, |name| std::env::var(name).ok())
}

fn validate(key: ConfigKey, value: &str) -> Result<()> {
    if value.is_empty() {
        anyhow::bail!("Value for {} must not be empty", key);
    }
    let is_http = value.starts_with("http://") || value.starts_with("https://");
    if key == ConfigKey::BaseUrl && !is_http {
        anyhow::bail!(
            "baseUrl must start with http:// or https://, got '{}'",
            value
        );
    }
    Ok(())
}

fn list(format: OutputFormat, stored: &StoredConfig, path: &str) {
    let entries: Vec<(ConfigKey, Option<(String, ValueSource)>)> = ConfigKey::ALL
        .iter()
        .map(|key| (*key, resolve(stored, *key)))
        .collect();

    let display = |key: ConfigKey, value: &str| match key {
        ConfigKey::ApiKey => mask_secret(value),
        ConfigKey::BaseUrl => value.to_string(),
    };

    match format {
        OutputFormat::Json => {
            let mut map = Map::new();
            for (key, entry) in &entries {
                let value = match entry {
                    Some((value, source)) => json!({
                        "value": display(*key, value),
                        "source": source.to_string(),
                    }),
                    None => Value::Null,
                };
                map.insert(key.to_string(), value);
            }
            map.insert("path".to_string(), Value::String(path.to_string()));
            println!(
                "{}",
                serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_default()
            );
        }
        OutputFormat::Pretty => {
            println!("📋 Current configuration ({}):", path);
            for (key, entry) in &entries {
                match entry {
                    Some((value, source)) => {
                        let shown = display(*key, value);
                        println!("   {:<8} {}  ({})", key.as_str(), shown, source);
                    }
                    None => println!("   {:<8} (not set)", key.as_str()),
                }
            }
        }
    }
}
