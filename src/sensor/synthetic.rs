//! Deterministic sensor source for tests and bench setups

use super::{ConnectionStatus, MAX_SENSORS, SensorAdapter, SensorLayout, SensorReadings};
use crate::environment::Environment;

/// Ticks a visitor spends in front of one sensor
const DWELL_TICKS: u32 = 64;
/// Closest reading of an approach
const NEAR: u16 = 40;
/// Reading when the visitor arrives and leaves
const FAR: u16 = 200;

/// Simulated visitor walking back and forth along the sensors
///
/// In front of each sensor the reading falls from `FAR` to `NEAR` and rises
/// again; every other sensor reads 0.
#[derive(Debug, Clone)]
pub struct SyntheticSensor {
    layout: SensorLayout,
    status: ConnectionStatus,
    step: u32,
}

impl SyntheticSensor {
    /// Create a source with `count` sensors (capped at [`MAX_SENSORS`])
    pub const fn new(count: usize, environment: Environment) -> Self {
        let count = if count > MAX_SENSORS { MAX_SENSORS } else { count };
        Self {
            layout: SensorLayout::new(count, environment),
            status: ConnectionStatus::Closed,
            step: 0,
        }
    }

    /// Sensor the visitor stands in front of, and its reading
    #[allow(clippy::cast_possible_truncation)]
    fn visitor(&self) -> Option<(usize, u16)> {
        let count = self.layout.count();
        if count == 0 {
            return None;
        }
        let stop = (self.step / DWELL_TICKS) as usize;
        // Walk 0..count-1 and back without repeating the end sensors
        let period = if count > 1 { 2 * (count - 1) } else { 1 };
        let leg = stop % period;
        let sensor = if leg < count { leg } else { period - leg };

        let half = DWELL_TICKS / 2;
        let phase = self.step % DWELL_TICKS;
        let approach = if phase < half { phase } else { DWELL_TICKS - phase };
        let span = u32::from(FAR - NEAR);
        let reading = u32::from(FAR) - span * approach / half;
        Some((sensor, reading as u16))
    }
}

impl SensorAdapter for SyntheticSensor {
    fn initialize(&mut self) -> usize {
        self.layout.count()
    }

    fn connect(&mut self) {
        self.status = ConnectionStatus::Open;
    }

    fn status(&self) -> ConnectionStatus {
        self.status
    }

    fn update(&mut self, readings: &mut SensorReadings) {
        *readings = SensorReadings::with_count(self.layout.count());
        if let Some((sensor, reading)) = self.visitor() {
            readings.set(sensor, reading);
        }
        self.step = self.step.wrapping_add(1);
    }

    fn position(&self, sensor: usize) -> i32 {
        self.layout.position(sensor)
    }

    fn disconnect(&mut self) {
        self.status = ConnectionStatus::Closed;
    }
}
