//! Particle pool and its replenishment rules
//!
//! Membership changes in two places only: [`ParticlePool::replenish`] adds
//! particles, and the sweep at the end of [`ParticlePool::update`] removes
//! the dead ones.

use alloc::vec::Vec;

use heapless::Vec as FixedVec;
use rand::Rng;

use crate::environment::Environment;
use crate::error::SpawnError;
use crate::particle::{Particle, ParticleKind, UNTRACKED_LIFE};
use crate::sensor::{MAX_SENSORS, SensorReadings};

/// One bucket of the ambient spawn distribution
///
/// A bucket is taken when the uniform draw is below `threshold`; buckets are
/// checked in order and the last one should have a threshold of 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnEntry {
    pub threshold: f32,
    pub kind: ParticleKind,
}

/// Default ambient distribution
pub const AMBIENT_SPAWN_TABLE: [SpawnEntry; 4] = [
    SpawnEntry {
        threshold: 0.0125,
        kind: ParticleKind::VioletGlow,
    },
    SpawnEntry {
        threshold: 0.10,
        kind: ParticleKind::SoftBlue,
    },
    SpawnEntry {
        threshold: 0.50,
        kind: ParticleKind::WarmAmber,
    },
    SpawnEntry {
        threshold: 1.0,
        kind: ParticleKind::Dim,
    },
];

/// Pick a kind from a spawn table for a draw in `0.0..1.0`
///
/// Falls back to the last entry when the draw is above every threshold.
pub fn pick_kind(table: &[SpawnEntry], draw: f32) -> Option<ParticleKind> {
    table
        .iter()
        .find(|entry| draw < entry.threshold)
        .or(table.last())
        .map(|entry| entry.kind)
}

/// What a replenish pass added to the pool
#[derive(Debug, Clone, Default)]
pub struct SpawnReport {
    /// Kind of the ambient particle, if one was spawned
    pub ambient: Option<ParticleKind>,
    /// Positions of the proximate particles spawned
    pub proximate: FixedVec<i32, MAX_SENSORS>,
    /// Proximate spawns rejected for an out-of-range position
    pub rejected: usize,
}

/// The set of live particles
#[derive(Debug, Clone)]
pub struct ParticlePool {
    environment: Environment,
    particles: Vec<Particle>,
    target: usize,
    threshold: u16,
    spawn_table: &'static [SpawnEntry],
}

impl ParticlePool {
    /// Create an empty pool
    ///
    /// `target` is the ambient fill level, `threshold` the proximity cutoff.
    pub fn new(environment: Environment, target: usize, threshold: u16) -> Self {
        Self {
            environment,
            particles: Vec::with_capacity(target),
            target,
            threshold,
            spawn_table: &AMBIENT_SPAWN_TABLE,
        }
    }

    /// Replace the ambient spawn distribution
    #[must_use]
    pub fn with_spawn_table(mut self, table: &'static [SpawnEntry]) -> Self {
        self.spawn_table = table;
        self
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Add a particle
    pub fn push(&mut self, particle: Particle) -> Result<(), SpawnError> {
        self.particles.push(Particle {
            position: self.environment.check(particle.position)?,
            ..particle
        });
        Ok(())
    }

    /// Remove every particle
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Evaluate the environment: spawn ambient and proximate particles
    ///
    /// At most one ambient particle is added per call, and only while the
    /// pool is below its target. Every reading with
    /// `0 < reading < threshold` spawns one proximate particle at
    /// `position(sensor)` that lives `threshold - reading` ticks.
    pub fn replenish<R, F>(
        &mut self,
        rng: &mut R,
        readings: &SensorReadings,
        position: F,
    ) -> SpawnReport
    where
        R: Rng + ?Sized,
        F: Fn(usize) -> i32,
    {
        let mut report = SpawnReport::default();

        if self.particles.len() < self.target {
            let draw = rng.gen_range(0.0f32..1.0);
            if let Some(kind) = pick_kind(self.spawn_table, draw) {
                // Ambient particles enter at the bottom of the strip
                if let Ok(particle) = kind.spawn(0, UNTRACKED_LIFE, self.environment) {
                    self.particles.push(particle);
                    report.ambient = Some(kind);
                }
            }
        }

        for (sensor, reading) in readings.iter() {
            if reading == 0 || reading >= self.threshold {
                continue;
            }
            let at = position(sensor);
            let life = i32::from(self.threshold - reading);
            match ParticleKind::Proximate.spawn(at, life, self.environment) {
                Ok(particle) => {
                    self.particles.push(particle);
                    let _ = report.proximate.push(at);
                }
                Err(_err) => {
                    #[cfg(feature = "log")]
                    tracing::warn!(sensor, error = %_err, "Rejected proximate particle");
                    report.rejected += 1;
                }
            }
        }

        report
    }

    /// Advance every particle by one tick and sweep the dead
    pub fn update(&mut self) {
        let environment = self.environment;
        for particle in &mut self.particles {
            particle.update(environment);
        }
        self.particles.retain(Particle::is_alive);
    }
}
