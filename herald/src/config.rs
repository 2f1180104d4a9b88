//! TOML file configuration.

use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use herald_provider::ProviderConfig;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "herald.toml";

fn default_base_url() -> String {
    "http://127.0.0.1:3002".to_string()
}

fn default_api_key() -> String {
    "dev-api-key".to_string()
}

const fn default_pacing_ms() -> u64 {
    100
}

/// Errors from loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Connection settings for the delivery provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// Base URL of the provider API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as a bearer token on every request.
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Optional per-request timeout. Off by default: the engine makes no
    /// latency assumption about the provider.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            request_timeout_secs: None,
        }
    }
}

/// Default run parameters; CLI flags override them.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSettings {
    /// Email template to send with.
    #[serde(default)]
    pub email_template: Option<String>,

    /// SMS template used when failover fires.
    #[serde(default)]
    pub sms_template: Option<String>,

    /// Whether bounced emails fail over to SMS.
    #[serde(default)]
    pub enable_sms_failover: bool,

    /// Inter-row pacing delay in milliseconds.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            email_template: None,
            sms_template: None,
            enable_sms_failover: false,
            pacing_ms: default_pacing_ms(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub run: RunSettings,

    /// Settings for the bundled mock provider.
    #[serde(default)]
    pub mock: ProviderConfig,
}

impl Config {
    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    /// Load configuration from an explicit path, or from
    /// [`DEFAULT_CONFIG_PATH`] when present, or fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an existing file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
