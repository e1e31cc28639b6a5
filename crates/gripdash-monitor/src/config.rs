//! Monitor configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Poll intervals and notification timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Device link status poll interval in milliseconds.
    #[serde(default = "default_connection_interval_ms")]
    pub connection_interval_ms: u64,
    /// Modbus health poll interval in milliseconds.
    #[serde(default = "default_modbus_interval_ms")]
    pub modbus_interval_ms: u64,
    /// Indicator digital-output poll interval in milliseconds.
    #[serde(default = "default_output_interval_ms")]
    pub output_interval_ms: u64,
    /// Full-status auto-refresh interval in milliseconds; 0 disables it.
    #[serde(default)]
    pub auto_refresh_ms: u64,
    /// How long a notice stays up before auto-dismissal, in milliseconds.
    #[serde(default = "default_notice_dismiss_ms")]
    pub notice_dismiss_ms: u64,
}

fn default_connection_interval_ms() -> u64 {
    3_000
}

fn default_modbus_interval_ms() -> u64 {
    10_000
}

fn default_output_interval_ms() -> u64 {
    5_000
}

fn default_notice_dismiss_ms() -> u64 {
    3_000
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            connection_interval_ms: default_connection_interval_ms(),
            modbus_interval_ms: default_modbus_interval_ms(),
            output_interval_ms: default_output_interval_ms(),
            auto_refresh_ms: 0,
            notice_dismiss_ms: default_notice_dismiss_ms(),
        }
    }
}

impl MonitorConfig {
    pub fn connection_interval(&self) -> Duration {
        Duration::from_millis(self.connection_interval_ms)
    }

    pub fn modbus_interval(&self) -> Duration {
        Duration::from_millis(self.modbus_interval_ms)
    }

    pub fn output_interval(&self) -> Duration {
        Duration::from_millis(self.output_interval_ms)
    }

    pub fn auto_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.auto_refresh_ms)
    }

    pub fn notice_dismiss(&self) -> Duration {
        Duration::from_millis(self.notice_dismiss_ms)
    }
}
