//! Application configuration.

use crate::error::{AppError, AppResult};
use gripdash_monitor::MonitorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration: backend address, request bounds and poll
/// timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend base URL, e.g. `http://192.168.1.50:8000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-attempt request deadline in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Total request attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff base in milliseconds; the delay after attempt N is N x base.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// Poll intervals and notification timing.
    #[serde(default)]
    pub monitor: MonitorConfig,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults if the file is absent.
    pub fn load(config_path: &str) -> AppResult<Self> {
        if Path::new(config_path).exists() {
            Self::from_file(config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            base_url = "http://192.168.1.50:8000"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "http://192.168.1.50:8000");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.monitor.connection_interval_ms, 3_000);
    }

    #[test]
    fn nested_monitor_section_parses() {
        let config: AppConfig = toml::from_str(
            r#"
            base_url = "http://localhost:8000"

            [monitor]
            connection_interval_ms = 1000
            auto_refresh_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.monitor.connection_interval_ms, 1_000);
        assert_eq!(config.monitor.auto_refresh_ms, 5_000);
        assert_eq!(config.monitor.modbus_interval_ms, 10_000);
    }
}
