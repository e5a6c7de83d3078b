//! Configuration error types for the config module.

use crate::connection::PolicyError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found at expected path
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read config file
    #[error("Failed to read configuration file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Failed to write config file
    #[error("Failed to write configuration file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Policy values rejected
    #[error("Invalid initialization policy: {0}")]
    Policy(#[from] PolicyError),

    /// Log filter directive rejected
    #[error("Invalid logging level '{level}': {message}")]
    LogLevel { level: String, message: String },

    /// Environment variable parse error
    #[error("Failed to parse environment variable '{var}': {message}")]
    EnvParseError { var: String, message: String },
}

impl ConfigError {
    /// Create an env parse error
    pub fn env_parse<V: Into<String>, M: Into<String>>(var: V, message: M) -> Self {
        Self::EnvParseError {
            var: var.into(),
            message: message.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::env_parse("SENSOR_BRINGUP_POLICY_MAX_ATTEMPTS", "Invalid number");
        assert_eq!(
            err.to_string(),
            "Failed to parse environment variable 'SENSOR_BRINGUP_POLICY_MAX_ATTEMPTS': Invalid number"
        );

        let err = ConfigError::from(PolicyError::NoAttempts);
        assert!(err.to_string().starts_with("Invalid initialization policy"));
    }
}
