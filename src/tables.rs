//! Precomputed position-to-pixel lookups
//!
//! Built once from the environment and read by the compositor on every
//! frame. Two tables are kept:
//! - the fine table splits a position between its two nearest pixels
//! - the coarse table snaps a position to a single pixel

use alloc::vec::Vec;

use crate::environment::Environment;
use crate::error::ConfigError;

/// Sub-pixel placement of one environment position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolation {
    /// Pixel at or below the position
    pub left: usize,
    /// Pixel above the position (`left + 1`)
    pub right: usize,
    /// Share of the color going to `left`
    pub weight_left: f32,
    /// Share of the color going to `right`
    pub weight_right: f32,
}

/// Fine and coarse lookup tables for one environment
#[derive(Debug, Clone)]
pub struct CoordinateTables {
    fine: Vec<Interpolation>,
    coarse: Vec<usize>,
}

impl CoordinateTables {
    /// Build tables for the given strip geometry
    pub fn new(pixel_length: usize, scale_factor: usize) -> Result<Self, ConfigError> {
        Ok(Self::build(Environment::new(pixel_length, scale_factor)?))
    }

    /// Build tables for a validated environment
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn build(environment: Environment) -> Self {
        let scale = environment.scale_factor();
        let length = environment.length();

        let fine = (0..length)
            .map(|position| {
                let left = position / scale;
                let frac = (position % scale) as f32 / scale as f32;
                Interpolation {
                    left,
                    right: left + 1,
                    weight_left: 1.0 - frac,
                    weight_right: frac,
                }
            })
            .collect();

        // One extra entry so a position equal to the length still resolves
        let pixels = environment.pixel_length() as u64;
        let coarse = (0..=length)
            .map(|tick| (tick as u64 * pixels / length as u64) as usize)
            .collect();

        Self { fine, coarse }
    }

    /// Number of positions covered by the fine table
    pub fn len(&self) -> usize {
        self.fine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fine.is_empty()
    }

    /// Get the two-pixel split for a position
    ///
    /// Returns None if the position is outside the environment
    pub fn fine(&self, position: i32) -> Option<&Interpolation> {
        let index = usize::try_from(position).ok()?;
        self.fine.get(index)
    }

    /// Get the nearest pixel for a position
    ///
    /// Returns None if the position is outside the environment
    pub fn coarse(&self, position: i32) -> Option<usize> {
        let index = usize::try_from(position).ok()?;
        self.coarse.get(index).copied()
    }
}
