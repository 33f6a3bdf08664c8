use alloc::vec;
use alloc::vec::Vec;

use crate::color::{Accumulator, Rgb};
use crate::environment::Environment;
use crate::particle::{Particle, RenderRule};
use crate::tables::CoordinateTables;

/// Length of the sweep trail in pixels
pub const SWEEP_TAIL: usize = 6;

/// Compositor - turns the particle pool into a pixel frame
///
/// Owns the accumulation buffer. Every render starts from the ambient color
/// and adds each particle's contribution in pool order.
#[derive(Debug, Clone)]
pub struct Compositor {
    buffer: Vec<Accumulator>,
    ambient: Accumulator,
    pixel_length: usize,
}

impl Compositor {
    /// Create a compositor for the environment's strip
    pub fn new(environment: Environment, ambient: Rgb) -> Self {
        let ambient = Accumulator::from_rgb(ambient);
        Self {
            buffer: vec![ambient; environment.buffer_len()],
            ambient,
            pixel_length: environment.pixel_length(),
        }
    }

    /// Compose one frame
    ///
    /// Given the same particles and tables the result is always the same.
    pub fn render<'p, I>(&mut self, particles: I, tables: &CoordinateTables) -> &[Accumulator]
    where
        I: IntoIterator<Item = &'p Particle>,
    {
        self.buffer.fill(self.ambient);
        for particle in particles {
            self.apply(particle, tables);
        }
        &self.buffer
    }

    /// Raw accumulators of the last frame, margin included
    pub fn accumulators(&self) -> &[Accumulator] {
        &self.buffer
    }

    /// Clamped colors of the strip's pixels, in logical order
    pub fn pixels(&self) -> impl ExactSizeIterator<Item = Rgb> + '_ {
        self.buffer[..self.pixel_length]
            .iter()
            .map(|slot| slot.to_rgb())
    }

    pub fn pixel_length(&self) -> usize {
        self.pixel_length
    }

    /// Apply one particle's render rule
    ///
    /// Particles outside the tables contribute nothing.
    fn apply(&mut self, particle: &Particle, tables: &CoordinateTables) {
        match particle.render {
            RenderRule::Brighten => self.discrete(particle, tables, 1.0),
            RenderRule::Darken => self.discrete(particle, tables, -1.0),
            RenderRule::BrightenSmooth => self.smooth(particle, tables, 1.0),
            RenderRule::DarkenSmooth => self.smooth(particle, tables, -1.0),
            RenderRule::Sweep => self.sweep(particle, tables),
        }
    }

    fn discrete(&mut self, particle: &Particle, tables: &CoordinateTables, sign: f32) {
        let Some(pixel) = tables.coarse(particle.position) else {
            return;
        };
        if let Some(slot) = self.buffer.get_mut(pixel) {
            slot.add_scaled(particle.color, sign * particle.intensity);
        }
    }

    fn smooth(&mut self, particle: &Particle, tables: &CoordinateTables, sign: f32) {
        let Some(split) = tables.fine(particle.position) else {
            return;
        };
        let factor = sign * particle.intensity;
        if let Some(slot) = self.buffer.get_mut(split.left) {
            slot.add_scaled(particle.color, split.weight_left * factor);
        }
        if let Some(slot) = self.buffer.get_mut(split.right) {
            slot.add_scaled(particle.color, split.weight_right * factor);
        }
    }

    /// Decaying trail ending at the particle, and a cleared pixel ahead of it
    #[allow(clippy::cast_precision_loss)]
    fn sweep(&mut self, particle: &Particle, tables: &CoordinateTables) {
        let Some(split) = tables.fine(particle.position) else {
            return;
        };
        let head = split.right;

        for offset in 0..SWEEP_TAIL {
            // Pixel 0 and anything before it is never part of the trail
            let Some(tail) = head.checked_sub(offset).filter(|&tail| tail > 0) else {
                continue;
            };
            let factor = (SWEEP_TAIL - offset) as f32 / SWEEP_TAIL as f32;
            if let Some(slot) = self.buffer.get_mut(tail) {
                slot.add_scaled(particle.color, factor * particle.intensity);
            }
        }

        let front = head + 1;
        if front < self.pixel_length.saturating_sub(2) {
            self.buffer[front] = Accumulator::BLACK;
        }
    }
}
