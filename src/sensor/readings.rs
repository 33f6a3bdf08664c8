//! Sensor readings vector and its thread/interrupt safe cell.
//!
//! A reader running on its own notification path (a serial thread, an
//! interrupt handler) writes into [`SharedReadings`]; the clock copies a
//! snapshot out once per tick. Both sides go through `critical-section`.

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use heapless::Vec;

use super::ConnectionStatus;

/// Maximum number of sensors a source can report
pub const MAX_SENSORS: usize = 32;

/// Most recent proximity value per sensor index
///
/// A value of 0 means "nothing detected".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorReadings {
    values: Vec<u16, MAX_SENSORS>,
}

impl SensorReadings {
    /// Create an empty readings vector
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Create a readings vector of `count` zeros
    ///
    /// The count is capped at [`MAX_SENSORS`].
    pub fn with_count(count: usize) -> Self {
        let mut readings = Self::new();
        let _ = readings.values.resize(count.min(MAX_SENSORS), 0);
        readings
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, sensor: usize) -> Option<u16> {
        self.values.get(sensor).copied()
    }

    /// Set the reading for a sensor, growing the vector with zeros if needed
    ///
    /// Returns false if the index is beyond [`MAX_SENSORS`].
    pub fn set(&mut self, sensor: usize, value: u16) -> bool {
        if sensor >= MAX_SENSORS {
            return false;
        }
        if sensor >= self.values.len() {
            let _ = self.values.resize(sensor + 1, 0);
        }
        self.values[sensor] = value;
        true
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Set every reading to 0, keeping the sensor count
    pub fn zero(&mut self) {
        self.values.fill(0);
    }

    /// Drop readings of sensors at or above `count`
    pub fn truncate(&mut self, count: usize) {
        self.values.truncate(count);
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.values
    }

    /// Iterate over `(sensor, reading)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, u16)> + '_ {
        self.values.iter().copied().enumerate()
    }
}

/// Readings and connection status shared between a sensor reader and the clock
pub struct SharedReadings {
    readings: Mutex<RefCell<SensorReadings>>,
    status: Mutex<Cell<ConnectionStatus>>,
}

impl SharedReadings {
    /// Create an empty cell with a closed connection
    pub const fn new() -> Self {
        Self {
            readings: Mutex::new(RefCell::new(SensorReadings::new())),
            status: Mutex::new(Cell::new(ConnectionStatus::Closed)),
        }
    }

    /// Store one reading
    ///
    /// Returns false if the index is beyond [`MAX_SENSORS`].
    pub fn store(&self, sensor: usize, value: u16) -> bool {
        critical_section::with(|cs| self.readings.borrow(cs).borrow_mut().set(sensor, value))
    }

    /// Replace the readings with a parsed frame of `(sensor, reading)` pairs
    ///
    /// Sensors missing from the frame read 0 afterwards. Only a frame that
    /// fails to parse leaves the previous values in place, and that never
    /// reaches this call. Returns the number of readings stored.
    pub fn store_frame<I>(&self, frame: I) -> usize
    where
        I: IntoIterator<Item = (usize, u16)>,
    {
        critical_section::with(|cs| {
            let mut readings = self.readings.borrow(cs).borrow_mut();
            readings.zero();
            let mut stored = 0;
            for (sensor, value) in frame {
                if readings.set(sensor, value) {
                    stored += 1;
                }
            }
            stored
        })
    }

    /// Copy the current readings into `out`
    pub fn snapshot(&self, out: &mut SensorReadings) {
        critical_section::with(|cs| {
            out.clone_from(&self.readings.borrow(cs).borrow());
        });
    }

    /// Reset to `count` zero readings
    pub fn reset(&self, count: usize) {
        critical_section::with(|cs| {
            *self.readings.borrow(cs).borrow_mut() = SensorReadings::with_count(count);
        });
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        critical_section::with(|cs| self.status.borrow(cs).set(status));
    }

    pub fn status(&self) -> ConnectionStatus {
        critical_section::with(|cs| self.status.borrow(cs).get())
    }
}

impl Default for SharedReadings {
    fn default() -> Self {
        Self::new()
    }
}
