//! Mock sensor platform for testing.
//!
//! Provides a `MockSensor` that plays the part of both the bus and the device
//! without requiring hardware. Handshake answers can be scripted one at a time
//! or fixed, and every call is counted so tests can assert on how the
//! initialization sequence drove the platform.

use super::error::BusError;
use super::traits::{BusConfigurator, SensorDriver};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Inner state of the mock, shared between clones.
#[derive(Debug)]
struct MockSensorState {
    /// Answers returned by upcoming handshakes, consumed front first.
    scripted: VecDeque<Result<bool, BusError>>,
    /// Answer used once the script is empty.
    responsive: bool,
    /// Error returned by the next `begin`, if any.
    begin_error: Option<BusError>,
    /// Error returned by the next `reset`, if any.
    reset_error: Option<BusError>,
    /// Every `(data, clock)` pair passed to `begin`.
    begin_log: Vec<(i32, i32)>,
    reset_count: usize,
    probe_count: usize,
}

/// Deterministic stand-in for a bus-attached sensor.
///
/// Clones share state, so a test can keep one handle while a
/// `DeviceConnection` owns another.
///
/// # Example
/// ```
/// use sensor_bringup::bus::{MockSensor, SensorDriver};
///
/// let mut sensor = MockSensor::responsive();
/// sensor.script_handshakes([false, true]);
///
/// assert!(!sensor.handshake_ok().unwrap());
/// assert!(sensor.handshake_ok().unwrap());
/// assert!(sensor.handshake_ok().unwrap()); // falls back to "responsive"
/// assert_eq!(sensor.probe_count(), 3);
/// ```
#[derive(Clone)]
pub struct MockSensor {
    state: Arc<Mutex<MockSensorState>>,
}

impl MockSensor {
    /// A sensor that answers every handshake.
    pub fn responsive() -> Self {
        Self::with_default_answer(true)
    }

    /// A sensor that never answers (absent or unpowered device).
    pub fn absent() -> Self {
        Self::with_default_answer(false)
    }

    fn with_default_answer(responsive: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockSensorState {
                scripted: VecDeque::new(),
                responsive,
                begin_error: None,
                reset_error: None,
                begin_log: Vec::new(),
                reset_count: 0,
                probe_count: 0,
            })),
        }
    }

    /// Queue handshake answers to be returned before the default answer.
    pub fn script_handshakes(&mut self, answers: impl IntoIterator<Item = bool>) {
        let mut state = self.state.lock();
        state.scripted.extend(answers.into_iter().map(Ok));
    }

    /// Queue a handshake that fails at the bus level.
    pub fn script_handshake_error(&mut self, error: BusError) {
        self.state.lock().scripted.push_back(Err(error));
    }

    /// Change the answer used once the script runs out.
    pub fn set_responsive(&mut self, responsive: bool) {
        self.state.lock().responsive = responsive;
    }

    /// Make the next `begin` call fail.
    pub fn fail_next_begin(&mut self, error: BusError) {
        self.state.lock().begin_error = Some(error);
    }

    /// Make the next `reset` call fail.
    pub fn fail_next_reset(&mut self, error: BusError) {
        self.state.lock().reset_error = Some(error);
    }

    /// Number of handshake probes that reached the device.
    pub fn probe_count(&self) -> usize {
        self.state.lock().probe_count
    }

    /// Number of reset calls.
    pub fn reset_count(&self) -> usize {
        self.state.lock().reset_count
    }

    /// Copy of every line pair passed to `begin`.
    pub fn begin_log(&self) -> Vec<(i32, i32)> {
        self.state.lock().begin_log.clone()
    }
}

impl Default for MockSensor {
    fn default() -> Self {
        Self::responsive()
    }
}

impl BusConfigurator for MockSensor {
    fn begin(&mut self, data_line: i32, clock_line: i32) -> Result<(), BusError> {
        let mut state = self.state.lock();
        state.begin_log.push((data_line, clock_line));
        match state.begin_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl SensorDriver for MockSensor {
    fn reset(&mut self) -> Result<(), BusError> {
        let mut state = self.state.lock();
        state.reset_count += 1;
        match state.reset_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn handshake_ok(&mut self) -> Result<bool, BusError> {
        let mut state = self.state.lock();
        state.probe_count += 1;
        let fallback = state.responsive;
        state.scripted.pop_front().unwrap_or(Ok(fallback))
    }
}

impl std::fmt::Debug for MockSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockSensor")
            .field("responsive", &state.responsive)
            .field("scripted", &state.scripted.len())
            .field("probe_count", &state.probe_count)
            .finish()
    }
}
