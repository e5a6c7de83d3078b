//! Device connection with bounded-retry initialization.
//!
//! `DeviceConnection` owns one sensor platform and a wait capability. Each
//! `initialize` call brings up the bus, arms the device and then probes it up
//! to `InitPolicy::max_attempts` times, waiting between failed probes. The
//! outcome is always a plain `bool`; bus errors are logged and treated as a
//! failed attempt.
//!
//! ```text
//! UNINITIALIZED --(probe ok)------------------------> INITIALIZED
//! UNINITIALIZED --(probe failed, attempts left)----> UNINITIALIZED (wait, retry)
//! UNINITIALIZED --(probe failed, none left)--------> FAILED (initialized = false)
//! ```
//!
//! Every call starts over from UNINITIALIZED, even after a previous success.

pub mod policy;

pub use policy::{InitPolicy, PolicyError};

use crate::bus::{BusConfigurator, SensorDriver, UNSET_LINE};
use embedded_hal::delay::DelayNs;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// One logical attachment of a sensor to a two-wire bus.
///
/// # Example
/// ```
/// use sensor_bringup::bus::{MockSensor, RecordingDelay};
/// use sensor_bringup::DeviceConnection;
///
/// let delay = RecordingDelay::new();
/// let mut sensor = DeviceConnection::new(MockSensor::responsive(), delay.clone());
///
/// assert!(sensor.initialize(6, 5));
/// assert!(sensor.is_initialized());
/// assert_eq!((sensor.data_line(), sensor.clock_line()), (6, 5));
/// assert_eq!(sensor.last_attempts(), 1);
/// ```
#[derive(Debug)]
pub struct DeviceConnection<P, D> {
    platform: P,
    delay: D,
    policy: InitPolicy,
    data_line: i32,
    clock_line: i32,
    initialized: bool,
    force_failure: bool,
    last_attempts: u8,
    last_requested_wait: Duration,
}

impl<P, D> DeviceConnection<P, D> {
    /// Create an uninitialized connection using the default policy.
    pub fn new(platform: P, delay: D) -> Self {
        Self::with_policy(platform, delay, InitPolicy::default())
    }

    /// Create an uninitialized connection with a custom policy.
    pub fn with_policy(platform: P, delay: D, policy: InitPolicy) -> Self {
        Self {
            platform,
            delay,
            policy,
            data_line: UNSET_LINE,
            clock_line: UNSET_LINE,
            initialized: false,
            force_failure: false,
            last_attempts: 0,
            last_requested_wait: Duration::ZERO,
        }
    }

    /// Force every handshake to fail without touching the device.
    ///
    /// Applies from the next `test_connection` or `initialize` call.
    pub fn set_simulate_connection_failure(&mut self, enabled: bool) {
        self.force_failure = enabled;
    }

    pub fn simulating_failure(&self) -> bool {
        self.force_failure
    }

    /// Outcome of the most recent `initialize`; `false` before the first call.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Data line of the most recent `initialize`, or `-1`.
    pub fn data_line(&self) -> i32 {
        self.data_line
    }

    /// Clock line of the most recent `initialize`, or `-1`.
    pub fn clock_line(&self) -> i32 {
        self.clock_line
    }

    /// Handshake attempts made by the most recent `initialize`.
    pub fn last_attempts(&self) -> u8 {
        self.last_attempts
    }

    /// Sum of the waits requested by the most recent `initialize`.
    pub fn last_requested_wait(&self) -> Duration {
        self.last_requested_wait
    }

    pub fn policy(&self) -> &InitPolicy {
        &self.policy
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Give back the platform and the wait capability.
    pub fn into_parts(self) -> (P, D) {
        (self.platform, self.delay)
    }
}

impl<P, D> DeviceConnection<P, D>
where
    P: BusConfigurator + SensorDriver,
    D: DelayNs,
{
    /// Bring up the bus on the given lines and verify the device answers.
    ///
    /// Returns `true` as soon as one handshake succeeds. When every attempt
    /// fails the call returns `false` after waiting the full policy time; it
    /// never returns early on the failing path.
    pub fn initialize(&mut self, data_line: i32, clock_line: i32) -> bool {
        self.data_line = data_line;
        self.clock_line = clock_line;
        self.initialized = false;
        self.last_attempts = 0;
        self.last_requested_wait = Duration::ZERO;

        info!(data_line, clock_line, "Initializing bus");
        if let Err(e) = self.platform.begin(data_line, clock_line) {
            warn!(data_line, clock_line, "Bus setup reported an error: {}", e);
        }
        self.wait(self.policy.bus_settle());

        if let Err(e) = self.platform.reset() {
            warn!("Device reset reported an error: {}", e);
        }
        self.wait(self.policy.device_settle());

        let mut remaining = self.policy.max_attempts();
        while remaining > 0 {
            self.last_attempts += 1;
            if self.test_connection() {
                self.initialized = true;
                info!(attempts = self.last_attempts, "Sensor initialized successfully");
                return true;
            }

            remaining -= 1;
            if remaining > 0 {
                warn!(
                    attempts_left = remaining,
                    "Sensor connection failed, retrying"
                );
                self.wait(self.policy.retry_delay());
            }
        }

        error!(
            attempts = self.last_attempts,
            "Sensor initialization failed after all retries"
        );
        self.initialized = false;
        false
    }

    /// Probe the device once.
    ///
    /// With failure simulation on this returns `false` without calling the
    /// driver at all.
    pub fn test_connection(&mut self) -> bool {
        if self.force_failure {
            error!("Sensor not detected on bus (simulated)");
            return false;
        }

        match self.platform.handshake_ok() {
            Ok(true) => {
                debug!("Sensor answered handshake");
                true
            }
            Ok(false) => {
                error!("Sensor not detected on bus");
                false
            }
            Err(e) => {
                error!("Sensor handshake failed: {}", e);
                false
            }
        }
    }

    fn wait(&mut self, duration: Duration) {
        self.delay.delay_ms(policy::as_delay_ms(duration));
        self.last_requested_wait += duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusError, MockSensor, RecordingDelay};

    fn connection(sensor: &MockSensor) -> (DeviceConnection<MockSensor, RecordingDelay>, RecordingDelay) {
        let delay = RecordingDelay::new();
        (DeviceConnection::new(sensor.clone(), delay.clone()), delay)
    }

    #[test]
    fn test_fresh_connection_defaults() {
        let (conn, _) = connection(&MockSensor::responsive());
        assert_eq!(conn.data_line(), -1);
        assert_eq!(conn.clock_line(), -1);
        assert!(!conn.is_initialized());
        assert!(!conn.simulating_failure());
        assert_eq!(conn.last_attempts(), 0);
    }

    #[test]
    fn test_success_on_first_attempt() {
        let sensor = MockSensor::responsive();
        let (mut conn, delay) = connection(&sensor);

        assert!(conn.initialize(6, 5));
        assert!(conn.is_initialized());
        assert_eq!(conn.last_attempts(), 1);
        assert_eq!(sensor.probe_count(), 1);
        assert_eq!(sensor.reset_count(), 1);
        assert_eq!(sensor.begin_log(), vec![(6, 5)]);
        assert_eq!(
            delay.requests(),
            vec![Duration::from_millis(100), Duration::from_millis(50)]
        );
    }

    #[test]
    fn test_success_after_retry() {
        let mut sensor = MockSensor::responsive();
        sensor.script_handshakes([false, false]);
        let (mut conn, delay) = connection(&sensor);

        assert!(conn.initialize(6, 5));
        assert_eq!(conn.last_attempts(), 3);
        assert_eq!(delay.total(), Duration::from_millis(1150));
    }

    #[test]
    fn test_absent_sensor_exhausts_retries() {
        let sensor = MockSensor::absent();
        let (mut conn, delay) = connection(&sensor);

        assert!(!conn.initialize(21, 22));
        assert!(!conn.is_initialized());
        assert_eq!(conn.last_attempts(), 3);
        assert_eq!(sensor.probe_count(), 3);
        assert_eq!(
            delay.requests(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(50),
                Duration::from_millis(500),
                Duration::from_millis(500),
            ]
        );
        assert_eq!(conn.last_requested_wait(), delay.total());
    }

    #[test]
    fn test_forced_failure_never_probes() {
        let sensor = MockSensor::responsive();
        let (mut conn, _) = connection(&sensor);
        conn.set_simulate_connection_failure(true);

        assert!(!conn.test_connection());
        assert!(!conn.initialize(6, 5));
        assert_eq!(conn.last_attempts(), 3);
        assert_eq!(sensor.probe_count(), 0);
    }

    #[test]
    fn test_handshake_error_counts_as_failed_attempt() {
        let mut sensor = MockSensor::responsive();
        sensor.script_handshake_error(BusError::NotStarted);
        let (mut conn, _) = connection(&sensor);

        assert!(conn.initialize(6, 5));
        assert_eq!(conn.last_attempts(), 2);
    }

    #[test]
    fn test_setup_errors_do_not_abort() {
        let mut sensor = MockSensor::responsive();
        sensor.fail_next_begin(BusError::open("busy"));
        sensor.fail_next_reset(BusError::NotStarted);
        let (mut conn, _) = connection(&sensor);

        assert!(conn.initialize(6, 5));
        assert_eq!(sensor.probe_count(), 1);
    }

    #[test]
    fn test_reinitialize_discards_previous_success() {
        let mut sensor = MockSensor::responsive();
        let (mut conn, _) = connection(&sensor);
        assert!(conn.initialize(6, 5));

        sensor.set_responsive(false);
        assert!(!conn.initialize(21, 22));
        assert!(!conn.is_initialized());
        assert_eq!((conn.data_line(), conn.clock_line()), (21, 22));
        assert_eq!(sensor.begin_log(), vec![(6, 5), (21, 22)]);
    }

    #[test]
    fn test_single_attempt_policy_never_waits_between_probes() {
        let policy = InitPolicy::new(
            1,
            policy::BUS_SETTLE,
            policy::DEVICE_SETTLE,
            policy::RETRY_DELAY,
        )
        .unwrap();
        let delay = RecordingDelay::new();
        let mut conn = DeviceConnection::with_policy(MockSensor::absent(), delay.clone(), policy);

        assert!(!conn.initialize(6, 5));
        assert_eq!(conn.last_attempts(), 1);
        assert_eq!(delay.total(), Duration::from_millis(150));
    }
}
