//! Configuration module for sensor-bringup.
//!
//! This module provides TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `SENSOR_BRINGUP_CONFIG` environment variable (explicit path)
//! 2. `./sensor-bringup.toml` (current directory)
//! 3. `~/.config/sensor-bringup/sensor-bringup.toml` (XDG on Linux/macOS)
//! 4. `%APPDATA%\sensor-bringup\sensor-bringup.toml` (Windows)
//! 5. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! The pattern is: `SENSOR_BRINGUP_<SECTION>_<KEY>`
//!
//! Examples:
//! - `SENSOR_BRINGUP_POLICY_MAX_ATTEMPTS=5`
//! - `SENSOR_BRINGUP_SUITE_SENSOR_PRESENT=false`
//! - `SENSOR_BRINGUP_LOGGING_FORMAT=json`
//!
//! Policy values are validated after overrides: waits may be lengthened but
//! never dropped below the built-in floors.
//!
//! # Example
//!
//! ```rust,ignore
//! use sensor_bringup::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load()?;
//! let policy = loader.config().policy.to_policy()?;
//! println!("Retry delay: {:?}", policy.retry_delay());
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use schema::{Config, LogFormat, LoggingConfig, PolicyConfig, SuiteConfig};
