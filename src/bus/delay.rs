//! Wait capabilities.
//!
//! Blocking waits go through `embedded_hal::delay::DelayNs` so the same
//! connection code runs against a real sleep or a recorder that returns
//! immediately.

use embedded_hal::delay::DelayNs;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Blocks the calling thread for the full requested time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Returns immediately and remembers every requested wait.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    requests: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every wait requested so far, in order.
    pub fn requests(&self) -> Vec<Duration> {
        self.requests.lock().clone()
    }

    /// Sum of all requested waits.
    pub fn total(&self) -> Duration {
        self.requests.lock().iter().sum()
    }

    pub fn clear(&self) {
        self.requests.lock().clear();
    }

    fn push(&self, wait: Duration) {
        self.requests.lock().push(wait);
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.push(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        self.push(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.push(Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_recording_delay_sums_requests() {
        let mut delay = RecordingDelay::new();
        delay.delay_ms(100);
        delay.delay_us(50);

        assert_eq!(
            delay.requests(),
            vec![Duration::from_millis(100), Duration::from_micros(50)]
        );
        assert_eq!(delay.total(), Duration::from_micros(100_050));
    }

    #[test]
    fn test_recording_delay_clones_share_log() {
        let observer = RecordingDelay::new();
        let mut owned = observer.clone();
        owned.delay_ms(5);
        assert_eq!(observer.total(), Duration::from_millis(5));

        observer.clear();
        assert!(owned.requests().is_empty());
    }

    #[test]
    fn test_std_delay_blocks() {
        let start = Instant::now();
        StdDelay.delay_ms(20);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
