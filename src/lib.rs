//! Sensor Bring-up Library
//!
//! This library brings a two-wire bus sensor into a known-good state with a
//! bounded-retry handshake, and verifies that behaviour without hardware.
//!
//! # Modules
//!
//! - `bus`: Capability traits, the I2C adapter, the mock sensor and wait implementations
//! - `connection`: `DeviceConnection` and its retry policy
//! - `report`: Assertion collection and summaries
//! - `suite`: Initialization scenarios driven against fresh connections
//! - `config`: Configuration management with TOML support
//! - `error`: Errors of the command-line runner

pub mod bus;
pub mod config;
pub mod connection;
pub mod error;
pub mod report;
pub mod suite;

// Re-export commonly used types for convenience
pub use bus::{
    BusConfigurator, BusError, DeviceIdentity, I2cSensor, MockSensor, RecordingDelay,
    SensorDriver, StdDelay, UNSET_LINE,
};
pub use connection::{DeviceConnection, InitPolicy, PolicyError};
pub use error::AppError;
pub use report::{Assertion, AssertionCollector, Summary};
pub use suite::{InitializationSuite, Scenario, SuiteLines};

pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
