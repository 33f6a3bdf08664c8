//! Sensor input
//!
//! Sensors report a proximity reading per index. The clock snapshots the
//! readings at the start of every tick and asks the adapter where each
//! sensor sits in the environment.

mod layout;
mod readings;
mod synthetic;

pub use layout::SensorLayout;
pub use readings::{MAX_SENSORS, SensorReadings, SharedReadings};
pub use synthetic::SyntheticSensor;

/// Connection state reported by a sensor source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Never connected, or closed on request
    #[default]
    Closed,
    /// A connection attempt is in progress
    Connecting,
    /// Readings are flowing
    Open,
    /// The last attempt failed or the connection dropped
    Failed,
}

/// Abstract proximity sensor source
///
/// Implement this trait for each kind of sensor hardware.
pub trait SensorAdapter {
    /// Prepare the source and return the number of sensors
    fn initialize(&mut self) -> usize;

    /// Start a connection attempt
    ///
    /// Must not block. Idempotent while a connection is open or in progress;
    /// the outcome is reported through [`SensorAdapter::status`].
    fn connect(&mut self);

    /// Current connection state
    fn status(&self) -> ConnectionStatus;

    /// Copy the latest readings into `readings`
    fn update(&mut self, readings: &mut SensorReadings);

    /// Environment position of a sensor
    ///
    /// Returns a safe default for unknown indices.
    fn position(&self, sensor: usize) -> i32;

    /// Release the connection
    fn disconnect(&mut self) {}
}

/// Ambient-only source: always open, no sensors
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSensors;

impl SensorAdapter for NoSensors {
    fn initialize(&mut self) -> usize {
        0
    }

    fn connect(&mut self) {}

    fn status(&self) -> ConnectionStatus {
        ConnectionStatus::Open
    }

    fn update(&mut self, readings: &mut SensorReadings) {
        readings.clear();
    }

    fn position(&self, _sensor: usize) -> i32 {
        0
    }
}
