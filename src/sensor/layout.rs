use crate::environment::Environment;

/// Maps sensor indices onto environment positions
///
/// Sensors are spread evenly along the strip; each one sits at the middle of
/// its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorLayout {
    count: usize,
    length: usize,
}

impl SensorLayout {
    pub const fn new(count: usize, environment: Environment) -> Self {
        Self {
            count,
            length: environment.length(),
        }
    }

    pub const fn count(self) -> usize {
        self.count
    }

    /// Environment position of a sensor
    ///
    /// Unknown indices map to position 0.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn position(self, sensor: usize) -> i32 {
        if sensor >= self.count {
            return 0;
        }
        let slot = (2 * sensor as u64 + 1) * self.length as u64;
        (slot / (2 * self.count as u64)) as i32
    }
}
