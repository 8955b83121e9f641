//! File-based configuration
//!
//! Reads `stackwatch.toml`:
//!
//! ```toml
//! [monitor]
//! poll_interval_ms = 5000
//! timeout_secs = 3600
//! intent = "create"
//! max_event_pages = 10
//!
//! [retry]
//! max_attempts = 5
//! base_delay_ms = 500
//! max_delay_ms = 20000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::Intent;
use crate::monitor::{MonitorConfig, RetryPolicy};

pub const CONFIG_FILE_NAME: &str = "stackwatch.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub monitor: MonitorSection,
    #[serde(default)]
    pub retry: RetrySection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    pub poll_interval_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub intent: Option<Intent>,
    pub max_event_pages: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

impl FileConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load from `explicit` if given, otherwise the first default location that
    /// exists. No file at all means defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_locations().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Overlay file values onto the built-in defaults.
    pub fn into_monitor_config(self) -> Result<MonitorConfig> {
        let mut config = MonitorConfig::default();
        let monitor = self.monitor;
        let retry = self.retry;

        if let Some(ms) = monitor.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = monitor.timeout_secs {
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(intent) = monitor.intent {
            config.intent = intent;
        }
        if let Some(pages) = monitor.max_event_pages {
            if pages == 0 {
                anyhow::bail!("monitor.max_event_pages must be at least 1");
            }
            config.max_event_pages = pages;
        }

        let defaults = RetryPolicy::default();
        let max_attempts = retry.max_attempts.unwrap_or(defaults.max_attempts);
        if max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }
        let base_delay = retry
            .base_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.base_delay);
        let max_delay = retry
            .max_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_delay);
        if max_delay < base_delay {
            anyhow::bail!("retry.max_delay_ms must not be smaller than retry.base_delay_ms");
        }
        config.retry = RetryPolicy::new(max_attempts, base_delay, max_delay);

        Ok(config)
    }
}

/// `./stackwatch.toml`, then `<config dir>/stackwatch/config.toml`
pub fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("stackwatch").join("config.toml"));
    }
    locations
}
