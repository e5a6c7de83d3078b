//! Real-bus adapter over `embedded-hal` I2C.
//!
//! Wraps any `embedded_hal::i2c::I2c` implementation with our own
//! `BusConfigurator`/`SensorDriver` traits. The bus itself is produced by an
//! opener closure when `begin` is called, since line routing is a property of
//! the HAL peripheral and only known at that point.

use super::error::BusError;
use super::traits::{BusConfigurator, SensorDriver};
use embedded_hal::i2c::{I2c, SevenBitAddress};
use tracing::{debug, trace};

/// Default 7-bit address of an MPU-6050 class IMU (AD0 low).
pub const DEFAULT_ADDRESS: SevenBitAddress = 0x68;

/// Identity register answering the handshake.
pub const WHO_AM_I_REGISTER: u8 = 0x75;

/// Power management register written to arm the device.
pub const POWER_MANAGEMENT_REGISTER: u8 = 0x6B;

/// Wake up, clock from the X gyro PLL.
const POWER_MANAGEMENT_ARM: u8 = 0x01;

/// Bits of the identity register that carry the device id.
const WHO_AM_I_MASK: u8 = 0x7E;

/// Identification parameters for the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// 7-bit bus address.
    pub address: SevenBitAddress,
    /// Expected identity value after masking.
    pub expected_id: u8,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            expected_id: 0x68,
        }
    }
}

/// Sensor on a real I2C bus.
///
/// `open` is called with the `(data, clock)` line pair on every `begin`; it
/// returns the ready-to-use bus or a description of why it couldn't.
///
/// # Example
/// ```no_run
/// # use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
/// # struct Bus;
/// # impl ErrorType for Bus { type Error = ErrorKind; }
/// # impl I2c for Bus {
/// #     fn transaction(&mut self, _: u8, _: &mut [Operation<'_>]) -> Result<(), ErrorKind> { Ok(()) }
/// # }
/// use sensor_bringup::bus::{DeviceIdentity, I2cSensor};
///
/// let sensor = I2cSensor::new(DeviceIdentity::default(), |_data, _clock| Ok::<_, String>(Bus));
/// ```
pub struct I2cSensor<BUS, F> {
    open: F,
    bus: Option<BUS>,
    identity: DeviceIdentity,
}

impl<BUS, F, E> I2cSensor<BUS, F>
where
    BUS: I2c,
    F: FnMut(i32, i32) -> Result<BUS, E>,
    E: std::fmt::Display,
{
    /// Create an adapter; no bus is opened until `begin`.
    pub fn new(identity: DeviceIdentity, open: F) -> Self {
        Self {
            open,
            bus: None,
            identity,
        }
    }

    /// The identity this adapter checks for.
    pub fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    /// Whether `begin` has produced a bus.
    pub fn is_started(&self) -> bool {
        self.bus.is_some()
    }

    /// Release the underlying bus, if one is open.
    pub fn release(self) -> Option<BUS> {
        self.bus
    }

    fn bus(&mut self) -> Result<&mut BUS, BusError> {
        self.bus.as_mut().ok_or(BusError::NotStarted)
    }
}

impl<BUS, F, E> BusConfigurator for I2cSensor<BUS, F>
where
    BUS: I2c,
    F: FnMut(i32, i32) -> Result<BUS, E>,
    E: std::fmt::Display,
{
    fn begin(&mut self, data_line: i32, clock_line: i32) -> Result<(), BusError> {
        // Drop any previous handle first so the opener can reclaim the lines.
        self.bus = None;
        let bus = (self.open)(data_line, clock_line).map_err(|e| BusError::open(e.to_string()))?;
        debug!(data_line, clock_line, "I2C bus opened");
        self.bus = Some(bus);
        Ok(())
    }
}

impl<BUS, F, E> SensorDriver for I2cSensor<BUS, F>
where
    BUS: I2c,
    F: FnMut(i32, i32) -> Result<BUS, E>,
    E: std::fmt::Display,
{
    fn reset(&mut self) -> Result<(), BusError> {
        let address = self.identity.address;
        self.bus()?
            .write(address, &[POWER_MANAGEMENT_REGISTER, POWER_MANAGEMENT_ARM])
            .map_err(BusError::transfer)
    }

    fn handshake_ok(&mut self) -> Result<bool, BusError> {
        let DeviceIdentity { address, expected_id } = self.identity;
        let mut id = [0u8; 1];
        self.bus()?
            .write_read(address, &[WHO_AM_I_REGISTER], &mut id)
            .map_err(BusError::transfer)?;

        trace!(raw = id[0], "identity register read");
        Ok(id[0] & WHO_AM_I_MASK == expected_id & WHO_AM_I_MASK)
    }
}

impl<BUS, F> std::fmt::Debug for I2cSensor<BUS, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I2cSensor")
            .field("identity", &self.identity)
            .field("started", &self.bus.is_some())
            .finish()
    }
}
