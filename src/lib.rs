#![no_std]

extern crate alloc;

pub mod clock;
pub mod color;
pub mod compositor;
pub mod config;
pub mod environment;
pub mod error;
pub mod particle;
pub mod pool;
pub mod sensor;
pub mod tables;

pub use clock::{ClockState, FrameStatus, SimulationClock, TickOutcome, TickResult};
pub use color::{Accumulator, Rgb};
pub use compositor::Compositor;
pub use config::SimulationConfig;
pub use environment::Environment;
pub use error::{ConfigError, SensorError, SinkError, SpawnError};
pub use particle::{Particle, ParticleKind, RenderRule, UpdateRule};
pub use pool::{ParticlePool, SpawnEntry, SpawnReport};
pub use sensor::{
    ConnectionStatus, NoSensors, SensorAdapter, SensorLayout, SensorReadings, SharedReadings,
    SyntheticSensor,
};
pub use tables::{CoordinateTables, Interpolation};
pub use embassy_time::{Duration, Instant};

/// Abstract pixel transport
///
/// Implement this trait to send frames to a remote or local LED controller.
/// The simulation clock is generic over this trait.
pub trait PixelSink {
    /// Stage a color for the pixel at `index`
    fn set_pixel(&mut self, index: usize, color: Rgb);

    /// Send the staged frame
    ///
    /// Must return within a bounded time. A [`SinkError::Timeout`] means the
    /// frame was dropped; the next frame is attempted as usual.
    fn flush(&mut self) -> Result<(), SinkError>;

    /// Release the underlying connection
    fn close(&mut self) {}
}
