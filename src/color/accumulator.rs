//! Floating-point pixel accumulator
//!
//! Particle contributions are summed in `f32` and only clamped to 8-bit
//! channels when the frame leaves the compositor.

use crate::color::Rgb;

/// One pixel slot of the composition buffer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Accumulator {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn from_rgb(color: Rgb) -> Self {
        Self {
            r: color.r as f32,
            g: color.g as f32,
            b: color.b as f32,
        }
    }

    /// Add `color * factor` to every channel
    ///
    /// A negative factor darkens.
    #[inline]
    pub fn add_scaled(&mut self, color: Rgb, factor: f32) {
        self.r += f32::from(color.r) * factor;
        self.g += f32::from(color.g) * factor;
        self.b += f32::from(color.b) * factor;
    }

    /// Clamp to the 0-255 channel range, truncating the fraction
    ///
    /// Overlapping particles may push a channel past 255 or below zero;
    /// those saturate instead of wrapping.
    #[inline]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_rgb(self) -> Rgb {
        Rgb {
            r: self.r.clamp(0.0, 255.0) as u8,
            g: self.g.clamp(0.0, 255.0) as u8,
            b: self.b.clamp(0.0, 255.0) as u8,
        }
    }
}
