//! Bus-specific error types.
//!
//! These never escape `DeviceConnection::initialize`; the connection logs them
//! and folds them into a failed attempt.

use embedded_hal::i2c::ErrorKind;
use thiserror::Error;

/// Errors raised by bus and driver capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// A driver call was made before `begin` brought the bus up.
    #[error("Bus has not been started")]
    NotStarted,

    /// The bus could not be brought up on the requested lines.
    #[error("Failed to open bus: {0}")]
    Open(String),

    /// A transfer on an open bus failed.
    #[error("Bus transfer failed: {0:?}")]
    Transfer(ErrorKind),
}

impl BusError {
    /// Create an Open error from a message.
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open(message.into())
    }

    /// Map any embedded-hal I2C error onto its portable kind.
    pub fn transfer<E: embedded_hal::i2c::Error>(err: E) -> Self {
        Self::Transfer(err.kind())
    }
}
