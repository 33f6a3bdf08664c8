//! Error types
//!
//! Only [`ConfigError`] is fatal. Everything else is reported to the clock,
//! logged, and absorbed so the tick loop keeps running.

use thiserror::Error;

/// Invalid static configuration, discovered once at startup
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("pixel length must be at least 1")]
    ZeroPixelLength,
    #[error("scale factor must be at least 1")]
    ZeroScaleFactor,
    #[error("environment of {pixel_length} pixels x {scale_factor} does not fit the position range")]
    EnvironmentTooLarge {
        pixel_length: usize,
        scale_factor: usize,
    },
    #[error("tick period must be greater than zero")]
    ZeroTickPeriod,
    #[error("{name} of {period_ms} ms exceeds the {max_ms} ms limit")]
    PeriodTooLong {
        name: &'static str,
        period_ms: u64,
        max_ms: u64,
    },
    #[error("{count} sensors requested, at most {max} are supported")]
    TooManySensors { count: usize, max: usize },
}

/// A particle could not be created
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    #[error("position {position} is outside the environment (0..{length})")]
    PositionOutOfRange { position: i32, length: usize },
}

/// Sensor source failures
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("sensor connection is unavailable")]
    Connection,
    #[error("sensor produced an unparsable reading")]
    MalformedReading,
}

/// Pixel transport failures
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    #[error("frame was not accepted within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    #[error("pixel sink is not connected")]
    Disconnected,
}
