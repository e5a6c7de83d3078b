//! Bus abstraction layer for sensor bring-up.
//!
//! Provides the capability traits the initialization sequence depends on,
//! a real I2C adapter, a deterministic mock, and the wait implementations.

pub mod delay;
pub mod error;
pub mod i2c;
pub mod mock;
pub mod traits;

pub use delay::{RecordingDelay, StdDelay};
pub use error::BusError;
pub use i2c::{DeviceIdentity, I2cSensor};
pub use mock::MockSensor;
pub use traits::*;
