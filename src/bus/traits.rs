//! Capability traits the initialization sequence depends on.
//!
//! Real hardware adapters and deterministic stubs both implement these, so the
//! retry logic never talks to a concrete driver.

use super::error::BusError;

/// Line identifier value meaning "not configured yet".
pub const UNSET_LINE: i32 = -1;

/// Brings up the two-wire bus on a pair of line identifiers.
pub trait BusConfigurator {
    /// Configure the bus on the given data and clock lines.
    ///
    /// Line identifiers are passed through untouched; whether a pair is legal
    /// is for the platform to decide.
    fn begin(&mut self, data_line: i32, clock_line: i32) -> Result<(), BusError>;
}

/// Device-level operations used during bring-up.
pub trait SensorDriver {
    /// Reset and arm the device so it can answer a handshake.
    fn reset(&mut self) -> Result<(), BusError>;

    /// Probe the device once.
    ///
    /// `Ok(false)` means the bus worked but the device did not identify itself.
    fn handshake_ok(&mut self) -> Result<bool, BusError>;
}

impl<T: BusConfigurator + ?Sized> BusConfigurator for &mut T {
    fn begin(&mut self, data_line: i32, clock_line: i32) -> Result<(), BusError> {
        (**self).begin(data_line, clock_line)
    }
}

impl<T: SensorDriver + ?Sized> SensorDriver for &mut T {
    fn reset(&mut self) -> Result<(), BusError> {
        (**self).reset()
    }

    fn handshake_ok(&mut self) -> Result<bool, BusError> {
        (**self).handshake_ok()
    }
}
