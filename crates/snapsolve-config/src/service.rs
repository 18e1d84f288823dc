use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::parse_or;

fn default_model() -> String {
    "gemini-2.5-pro-exp-03-25".to_string()
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

/// Upper bound on `MAX_RETRIES`
pub const MAX_RETRIES_LIMIT: u32 = 5;

/// Upper bound on `RETRY_BACKOFF_MS`
pub const RETRY_BACKOFF_LIMIT_MS: u64 = 30_000;

/// Remote model endpoint settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first attempt, transient failures only
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl ServiceConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let model = lookup("MODEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(default_model);

        let api_url = lookup("API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(default_api_url);

        Self {
            model,
            api_url,
            // Zero would fail every request instantly
            timeout_secs: match parse_or(lookup, "REQUEST_TIMEOUT_SECS", default_timeout_secs()) {
                0 => default_timeout_secs(),
                secs => secs,
            },
            max_retries: parse_or(lookup, "MAX_RETRIES", default_max_retries())
                .min(MAX_RETRIES_LIMIT),
            retry_backoff_ms: parse_or(lookup, "RETRY_BACKOFF_MS", default_retry_backoff_ms())
                .min(RETRY_BACKOFF_LIMIT_MS),
        }
    }

    /// Per-request timeout, never zero
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(default_timeout_secs()),
            secs => Duration::from_secs(secs),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.min(MAX_RETRIES_LIMIT)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.min(RETRY_BACKOFF_LIMIT_MS))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}
