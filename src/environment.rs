use crate::error::{ConfigError, SpawnError};

/// Extra pixel slots past the end of the strip
///
/// Interpolation writes to `left + 1`, which overflows the strip at the top
/// end of the environment.
pub const BUFFER_MARGIN: usize = 3;

/// The fine-grained 1-D space particles move in
///
/// Positions run over `0..length()`, where `length = pixel_length * scale_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    pixel_length: usize,
    scale_factor: usize,
}

impl Environment {
    /// Validate the strip geometry
    pub const fn new(pixel_length: usize, scale_factor: usize) -> Result<Self, ConfigError> {
        if pixel_length == 0 {
            return Err(ConfigError::ZeroPixelLength);
        }
        if scale_factor == 0 {
            return Err(ConfigError::ZeroScaleFactor);
        }
        match pixel_length.checked_mul(scale_factor) {
            Some(length) if length <= i32::MAX as usize => Ok(Self {
                pixel_length,
                scale_factor,
            }),
            _ => Err(ConfigError::EnvironmentTooLarge {
                pixel_length,
                scale_factor,
            }),
        }
    }

    /// Number of physical pixels on the strip
    pub const fn pixel_length(self) -> usize {
        self.pixel_length
    }

    /// Environment positions per pixel
    pub const fn scale_factor(self) -> usize {
        self.scale_factor
    }

    /// Number of environment positions
    pub const fn length(self) -> usize {
        self.pixel_length * self.scale_factor
    }

    /// Highest valid position
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn last_position(self) -> i32 {
        (self.length() - 1) as i32
    }

    /// Size of the compositor's pixel buffer
    pub const fn buffer_len(self) -> usize {
        self.pixel_length + BUFFER_MARGIN
    }

    /// Check if the position is inside the environment
    pub const fn contains(self, position: i32) -> bool {
        position >= 0 && position <= self.last_position()
    }

    /// Validate a position for a new particle
    pub const fn check(self, position: i32) -> Result<i32, SpawnError> {
        if self.contains(position) {
            Ok(position)
        } else {
            Err(SpawnError::PositionOutOfRange {
                position,
                length: self.length(),
            })
        }
    }
}
