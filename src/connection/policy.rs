//! Retry and settle timing for device bring-up.

use std::time::Duration;
use thiserror::Error;

/// Handshake attempts per `initialize` call.
pub const MAX_ATTEMPTS: u8 = 3;
/// Wait after bringing up the bus.
pub const BUS_SETTLE: Duration = Duration::from_millis(100);
/// Wait after resetting the device.
pub const DEVICE_SETTLE: Duration = Duration::from_millis(50);
/// Wait between two failed handshakes.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Rejected policy values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("At least one handshake attempt is required")]
    NoAttempts,

    /// A wait is shorter than the hardware needs.
    #[error("{name} of {actual:?} is below the minimum of {minimum:?}")]
    TooShort {
        name: &'static str,
        actual: Duration,
        minimum: Duration,
    },

    /// A wait does not fit the millisecond delay interface.
    #[error("{name} of {actual:?} exceeds the supported maximum")]
    TooLong { name: &'static str, actual: Duration },
}

/// Timing policy of one `initialize` call.
///
/// The defaults are the fixed policy constants above. Custom policies may only
/// lengthen waits or add attempts, so the timing floors hold for every
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitPolicy {
    max_attempts: u8,
    bus_settle: Duration,
    device_settle: Duration,
    retry_delay: Duration,
}

impl InitPolicy {
    /// Build a validated policy.
    pub fn new(
        max_attempts: u8,
        bus_settle: Duration,
        device_settle: Duration,
        retry_delay: Duration,
    ) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::NoAttempts);
        }
        check_wait("bus settle delay", bus_settle, BUS_SETTLE)?;
        check_wait("device settle delay", device_settle, DEVICE_SETTLE)?;
        check_wait("retry delay", retry_delay, RETRY_DELAY)?;

        Ok(Self {
            max_attempts,
            bus_settle,
            device_settle,
            retry_delay,
        })
    }

    pub fn max_attempts(&self) -> u8 {
        self.max_attempts
    }

    pub fn bus_settle(&self) -> Duration {
        self.bus_settle
    }

    pub fn device_settle(&self) -> Duration {
        self.device_settle
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Total waiting on a call whose every handshake fails.
    pub fn exhausted_wait(&self) -> Duration {
        self.bus_settle
            + self.device_settle
            + self.retry_delay * u32::from(self.max_attempts - 1)
    }
}

impl Default for InitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            bus_settle: BUS_SETTLE,
            device_settle: DEVICE_SETTLE,
            retry_delay: RETRY_DELAY,
        }
    }
}

fn check_wait(name: &'static str, actual: Duration, minimum: Duration) -> Result<(), PolicyError> {
    if actual < minimum {
        return Err(PolicyError::TooShort {
            name,
            actual,
            minimum,
        });
    }
    if rounded_millis(actual) > u128::from(u32::MAX) {
        return Err(PolicyError::TooLong { name, actual });
    }
    Ok(())
}

fn rounded_millis(wait: Duration) -> u128 {
    let partial = u128::from(wait.subsec_nanos() % 1_000_000 != 0);
    wait.as_millis() + partial
}

/// Whole milliseconds for `DelayNs::delay_ms`, rounded up so a wait is never
/// shortened. Policies are validated to fit.
pub(crate) fn as_delay_ms(wait: Duration) -> u32 {
    u32::try_from(rounded_millis(wait)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = InitPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.bus_settle(), Duration::from_millis(100));
        assert_eq!(policy.device_settle(), Duration::from_millis(50));
        assert_eq!(policy.retry_delay(), Duration::from_millis(500));
        assert_eq!(policy.exhausted_wait(), Duration::from_millis(1150));
    }

    #[test]
    fn test_longer_policy_accepted() {
        let policy = InitPolicy::new(
            5,
            Duration::from_millis(200),
            Duration::from_millis(50),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(policy.exhausted_wait(), Duration::from_millis(4250));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = InitPolicy::new(0, BUS_SETTLE, DEVICE_SETTLE, RETRY_DELAY).unwrap_err();
        assert_eq!(err, PolicyError::NoAttempts);
    }

    #[test]
    fn test_short_retry_delay_rejected() {
        let err = InitPolicy::new(3, BUS_SETTLE, DEVICE_SETTLE, Duration::from_millis(499))
            .unwrap_err();
        assert!(matches!(err, PolicyError::TooShort { name: "retry delay", .. }));
        assert!(err.to_string().contains("retry delay"));
    }

    #[test]
    fn test_delay_ms_rounds_up() {
        assert_eq!(as_delay_ms(Duration::from_millis(500)), 500);
        assert_eq!(as_delay_ms(Duration::from_micros(100_001)), 101);
    }

    #[test]
    fn test_longest_wait_fits_delay_interface() {
        let longest = Duration::from_millis(u64::from(u32::MAX));
        let policy = InitPolicy::new(3, BUS_SETTLE, DEVICE_SETTLE, longest).unwrap();
        assert_eq!(as_delay_ms(policy.retry_delay()), u32::MAX);

        // One nanosecond more would need u32::MAX + 1 ms after rounding up.
        let err = InitPolicy::new(3, BUS_SETTLE, DEVICE_SETTLE, longest + Duration::from_nanos(1))
            .unwrap_err();
        assert!(matches!(err, PolicyError::TooLong { name: "retry delay", .. }));
    }

    #[test]
    fn test_oversized_wait_rejected() {
        let huge = Duration::from_millis(u64::from(u32::MAX) + 1);
        let err = InitPolicy::new(3, huge, DEVICE_SETTLE, RETRY_DELAY).unwrap_err();
        assert!(matches!(err, PolicyError::TooLong { .. }));
    }
}
