//! Service configuration
//!
//! Values come from the `[service]` table of `paperdok.toml` and are then
//! overridden by the environment:
//!
//! | Variable              | Field          |
//! |-----------------------|----------------|
//! | `PDF_SERVICE_URL`     | `url`          |
//! | `PDF_SERVICE_TIMEOUT` | `timeout_secs` |
//! | `USE_PDF_SERVICE`     | `enabled`      |

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default service URL
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";

pub const ENV_URL: &str = "PDF_SERVICE_URL";
pub const ENV_TIMEOUT: &str = "PDF_SERVICE_TIMEOUT";
pub const ENV_ENABLED: &str = "USE_PDF_SERVICE";

/// Conversion service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL, without trailing slash
    pub url: String,
    /// Timeout for conversion requests
    pub timeout_secs: u64,
    /// When false, PDF acquisition goes straight to the local converter
    pub enabled: bool,
    /// Attempts made by `convert_with_retry`
    pub max_retries: u32,
    /// Base delay in seconds for exponential backoff
    pub backoff_factor: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVICE_URL.to_string(),
            timeout_secs: 30,
            enabled: true,
            max_retries: 3,
            backoff_factor: 0.5,
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override fields from any variable source
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL).filter(|u| !u.trim().is_empty()) {
            self.url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => log::warn!("Ignoring invalid {}={:?}", ENV_TIMEOUT, raw),
            }
        }
        if let Some(raw) = lookup(ENV_ENABLED) {
            match parse_flag(&raw) {
                Some(enabled) => self.enabled = enabled,
                None => log::warn!("Ignoring invalid {}={:?}", ENV_ENABLED, raw),
            }
        }
    }

    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
