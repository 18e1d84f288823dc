use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

use self::capture::CaptureConfig;
use self::hotkey::HotkeyConfig;
use self::service::ServiceConfig;

pub mod capture;
pub mod hotkey;
pub mod service;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_KEY not found in environment variables")]
    MissingApiKey,
}

/// Process-wide settings, read once at startup
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Credential for the answer service
    #[serde(skip_serializing)]
    pub api_key: String,
    pub hotkey: HotkeyConfig,
    pub service: ServiceConfig,
    pub capture: CaptureConfig,
}

impl Config {
    /// Build the config from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Config {
            api_key,
            hotkey: HotkeyConfig::from_lookup(&lookup),
            service: ServiceConfig::from_lookup(&lookup),
            capture: CaptureConfig::from_lookup(&lookup),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("hotkey", &self.hotkey)
            .field("service", &self.service)
            .field("capture", &self.capture)
            .finish()
    }
}

/// Parse a numeric variable, keeping the default when absent or malformed
pub(crate) fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
