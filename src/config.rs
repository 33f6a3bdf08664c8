use embassy_time::Duration;

use crate::color::Rgb;
use crate::environment::Environment;
use crate::error::ConfigError;

pub const DEFAULT_PIXEL_LENGTH: usize = 300;
pub const DEFAULT_SCALE_FACTOR: usize = 7;
pub const DEFAULT_PARTICLE_COUNT: usize = 200;
pub const DEFAULT_PROXIMITY_THRESHOLD: u16 = 150;
pub const DEFAULT_TICK_PERIOD_MS: u64 = 30;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 5_000;
pub const DEFAULT_AMBIENT: [u8; 3] = [20, 20, 40];

/// Longest accepted tick period or retry backoff (one hour)
pub const MAX_PERIOD_MS: u64 = 3_600_000;

/// Configuration for the simulation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Physical pixels on the strip
    pub pixel_length: usize,
    /// Environment positions per pixel
    pub scale_factor: usize,
    /// Pool size the ambient spawner fills up to
    pub particle_count: usize,
    /// Readings below this distance spawn proximate particles
    pub proximity_threshold: u16,
    /// Period of the running tick
    pub tick_period_ms: u64,
    /// Delay between sensor reconnect attempts
    pub retry_backoff_ms: u64,
    /// Color every pixel is reset to before composition
    pub ambient: [u8; 3],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            pixel_length: DEFAULT_PIXEL_LENGTH,
            scale_factor: DEFAULT_SCALE_FACTOR,
            particle_count: DEFAULT_PARTICLE_COUNT,
            proximity_threshold: DEFAULT_PROXIMITY_THRESHOLD,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            ambient: DEFAULT_AMBIENT,
        }
    }
}

impl SimulationConfig {
    /// Validate the configuration and derive the environment
    pub const fn environment(&self) -> Result<Environment, ConfigError> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.tick_period_ms > MAX_PERIOD_MS {
            return Err(ConfigError::PeriodTooLong {
                name: "tick_period_ms",
                period_ms: self.tick_period_ms,
                max_ms: MAX_PERIOD_MS,
            });
        }
        if self.retry_backoff_ms > MAX_PERIOD_MS {
            return Err(ConfigError::PeriodTooLong {
                name: "retry_backoff_ms",
                period_ms: self.retry_backoff_ms,
                max_ms: MAX_PERIOD_MS,
            });
        }
        Environment::new(self.pixel_length, self.scale_factor)
    }

    pub const fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub const fn ambient_color(&self) -> Rgb {
        let [r, g, b] = self.ambient;
        Rgb { r, g, b }
    }
}
