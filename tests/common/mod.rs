//! Shared test utilities for sensor bring-up tests.
//!
//! This module provides common test infrastructure including:
//! - Connections wired to a mock sensor and a recording delay
//! - A fake I2C bus with scripted identity answers
//! - Log capture setup

#![allow(dead_code)]

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use sensor_bringup::{DeviceConnection, MockSensor, RecordingDelay};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Install a test-friendly subscriber once; later calls are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("sensor_bringup=debug")
        .with_test_writer()
        .try_init();
}

/// Connection over `sensor` whose waits are recorded, plus the recorder.
pub fn recorded_connection(
    sensor: &MockSensor,
) -> (DeviceConnection<MockSensor, RecordingDelay>, RecordingDelay) {
    let delay = RecordingDelay::new();
    (
        DeviceConnection::new(sensor.clone(), delay.clone()),
        delay,
    )
}

/// What the fake bus does on one transaction.
#[derive(Debug, Clone, Copy)]
pub enum BusReply {
    /// Acknowledge; reads return this byte.
    Ack(u8),
    /// No device acknowledged the address.
    Nack,
}

#[derive(Debug, Default)]
struct FakeBusState {
    replies: VecDeque<BusReply>,
    fallback: Option<u8>,
    writes: Vec<Vec<u8>>,
    transactions: usize,
}

/// I2C bus with a scripted reply per transaction.
///
/// Clones share state, so the test keeps a handle after the opener moves one
/// into the adapter.
#[derive(Debug, Clone, Default)]
pub struct FakeI2cBus {
    state: Arc<Mutex<FakeBusState>>,
}

impl FakeI2cBus {
    /// A bus whose device always answers reads with `id`.
    pub fn answering(id: u8) -> Self {
        let bus = Self::default();
        bus.state.lock().unwrap().fallback = Some(id);
        bus
    }

    /// A bus with nothing attached.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push_replies(&self, replies: impl IntoIterator<Item = BusReply>) {
        self.state.lock().unwrap().replies.extend(replies);
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn transactions(&self) -> usize {
        self.state.lock().unwrap().transactions
    }
}

impl ErrorType for FakeI2cBus {
    type Error = ErrorKind;
}

impl I2c for FakeI2cBus {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        state.transactions += 1;

        let reply = match state.replies.pop_front() {
            Some(reply) => reply,
            None => match state.fallback {
                Some(id) => BusReply::Ack(id),
                None => BusReply::Nack,
            },
        };
        let id = match reply {
            BusReply::Ack(id) => id,
            BusReply::Nack => {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
        };

        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => state.writes.push(bytes.to_vec()),
                Operation::Read(buf) => buf.fill(id),
            }
        }
        Ok(())
    }
}
