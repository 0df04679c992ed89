use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub use_mock: bool,
}

impl Config {
    /// Load configuration from file and environment variables.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file().unwrap_or_else(|_| {
            info!("No config file found, using defaults");
            Self::default()
        });

        // Environment variables override the config file
        if std::env::var("NETA_USE_MOCK").is_ok() {
            config.use_mock = true;
        }

        Ok(config)
    }

    fn load_from_file() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            info!("Loaded config from: {}", config_path.display());
            Ok(config)
        } else {
            Err(anyhow!("Config file not found"))
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        info!("Saved config to: {}", config_path.display());
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".neta"))
    }

    pub fn is_mock_mode(&self) -> bool {
        self.use_mock
    }

    /// Resolve the API key: environment variable first, then the credential
    /// store. Returns None when neither is set.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            if !api_key.trim().is_empty() {
                return Some(api_key);
            }
        }
        crate::credential_store::get_api_key()
    }

    /// Print configuration status. The credential value itself is never
    /// displayed, only whether one is set.
    pub fn show_config_info() -> Result<()> {
        let config_path = Self::config_path()?;
        println!("Configuration file: {}", config_path.display());
        println!(
            "Status: {}",
            if config_path.exists() {
                "Found"
            } else {
                "Not found (using defaults)"
            }
        );

        let config = Self::load()?;
        let key_set = config.resolve_api_key().is_some();
        println!("API Key: {}", if key_set { "Set" } else { "Not set" });
        println!("Mock mode: {}", config.use_mock);

        println!("\nTo set API key:");
        println!("  neta --set-api-key <your-key>");
        println!("\nOr set environment variable:");
        println!("  export OPENAI_API_KEY=<your-key>");

        Ok(())
    }
}
