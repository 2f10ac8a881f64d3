//! Config model and persistence helpers.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::model::Quality;

/// Top-level configuration stored in `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the conversion service lives and how to talk to it.
    pub server: ServerCfg,
    /// Initial values for the conversion form.
    pub defaults: DefaultsCfg,
}

/// Conversion service endpoint and request policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
    /// Origin of the service, without a trailing path.
    pub base_url: String,
    /// Upper bound for one conversion request, including the transcode.
    pub request_timeout_secs: u64,
    /// Extra attempts after a connect failure or timeout.
    pub retries: u32,
    /// Pause between those attempts.
    pub retry_delay_ms: u64,
}

/// Form defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsCfg {
    /// Bitrate selected when the app starts.
    pub quality: Quality,
}

impl ServerCfg {
    /// Base URL with any trailing slash removed, ready for path joining.
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for ServerCfg {
    /// Defaults match a service started locally with its stock settings.
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            request_timeout_secs: 300,
            retries: 0,
            retry_delay_ms: 1000,
        }
    }
}

impl Config {
    /// Load from disk or create defaults when missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            Ok(toml::from_str(&s)?)
        } else {
            let cfg = Self::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    /// Persist the config as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let s = toml::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }
}
