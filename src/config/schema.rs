//! Configuration schema definitions.
//!
//! This module defines the structure of the configuration file using serde.
//! Every section has defaults, so an empty file is a valid configuration.

use super::error::{ConfigError, ConfigResult};
use crate::connection::policy::{self, InitPolicy, PolicyError};
use crate::suite::SuiteLines;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Retry and settle timing
    pub policy: PolicyConfig,
    /// Scenario suite settings
    pub suite: SuiteConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Check values that serde alone cannot.
    pub fn validate(&self) -> ConfigResult<()> {
        self.policy.to_policy()?;
        EnvFilter::try_new(&self.logging.level).map_err(|e| ConfigError::LogLevel {
            level: self.logging.level.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// Initialization policy section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Handshake attempts per initialization
    pub max_attempts: u8,
    /// Wait after bus setup, in milliseconds
    pub bus_settle_ms: u64,
    /// Wait after device reset, in milliseconds
    pub device_settle_ms: u64,
    /// Wait between failed handshakes, in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let defaults = InitPolicy::default();
        Self {
            max_attempts: defaults.max_attempts(),
            bus_settle_ms: policy::BUS_SETTLE.as_millis() as u64,
            device_settle_ms: policy::DEVICE_SETTLE.as_millis() as u64,
            retry_delay_ms: policy::RETRY_DELAY.as_millis() as u64,
        }
    }
}

impl PolicyConfig {
    /// Build the validated runtime policy.
    pub fn to_policy(&self) -> Result<InitPolicy, PolicyError> {
        InitPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.bus_settle_ms),
            Duration::from_millis(self.device_settle_ms),
            Duration::from_millis(self.retry_delay_ms),
        )
    }
}

/// Scenario suite section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Data line of the board wiring
    pub data_line: i32,
    /// Clock line of the board wiring
    pub clock_line: i32,
    /// Data line of the alternate pair
    pub alternate_data_line: i32,
    /// Clock line of the alternate pair
    pub alternate_clock_line: i32,
    /// Whether the simulated sensor answers handshakes
    pub sensor_present: bool,
    /// Block for real instead of recording waits
    pub real_delays: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        let lines = SuiteLines::default();
        Self {
            data_line: lines.primary.0,
            clock_line: lines.primary.1,
            alternate_data_line: lines.alternate.0,
            alternate_clock_line: lines.alternate.1,
            sensor_present: true,
            real_delays: false,
        }
    }
}

impl SuiteConfig {
    pub fn lines(&self) -> SuiteLines {
        SuiteLines {
            primary: (self.data_line, self.clock_line),
            alternate: (self.alternate_data_line, self.alternate_clock_line),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset, e.g. "info" or "sensor_bringup=debug"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    #[default]
    Pretty,
    /// Compact format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}
