//! Particle model and factory
//!
//! Behavior is a closed set of update and render rules, dispatched by
//! `match`. Kinds bundle a rule pair with a velocity and a color.

use crate::color::{Rgb, rgb_from_u32};
use crate::environment::Environment;
use crate::error::SpawnError;

/// Intensity lost per tick by reactive particles
pub const REACTIVE_DECAY: f32 = 0.01;

/// Life given to particles that are not aged
///
/// Drift particles keep this value until they leave the environment.
pub const UNTRACKED_LIFE: i32 = 1;

/// Per-tick motion and aging policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRule {
    /// Move by velocity, never age; removed past the top of the environment
    Drift,
    /// Move by velocity, lose life and intensity; removed at either edge or
    /// when life runs out
    Reactive,
}

/// How a particle's color is distributed into the pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRule {
    /// Add color to the nearest pixel
    Brighten,
    /// Subtract color from the nearest pixel
    Darken,
    /// Add color split between the two nearest pixels
    BrightenSmooth,
    /// Subtract color split between the two nearest pixels
    DarkenSmooth,
    /// Comet: a decaying trail behind the particle and a dark pixel ahead
    Sweep,
}

/// Removal predicate evaluated after each update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Position beyond the last environment position
    PastEnd,
    /// Position below 1, beyond the last position, or life below 1
    Expired,
}

impl UpdateRule {
    pub const fn removal(self) -> Removal {
        match self {
            Self::Drift => Removal::PastEnd,
            Self::Reactive => Removal::Expired,
        }
    }
}

impl Removal {
    /// Check if a particle should be removed
    pub const fn applies(self, particle: &Particle, environment: Environment) -> bool {
        let past_end = particle.position > environment.last_position();
        match self {
            Self::PastEnd => past_end,
            Self::Expired => particle.position < 1 || past_end || particle.life < 1,
        }
    }
}

/// Known particle kinds
///
/// The default ambient table only draws the first four. `Spark`, `Shadow`
/// and `Eclipse` are building blocks for custom spawn tables passed to
/// [`ParticlePool::with_spawn_table`](crate::ParticlePool::with_spawn_table),
/// or for particles pushed directly into the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Fast violet comet
    VioletGlow,
    /// Soft blue drifter
    SoftBlue,
    /// Warm amber drifter
    WarmAmber,
    /// Dim background drifter
    Dim,
    /// Single-pixel spark without interpolation
    Spark,
    /// Slow smoothed shadow that darkens what it passes
    Shadow,
    /// Fast single-pixel dark spot
    Eclipse,
    /// Warm white glow spawned by a sensor reading
    Proximate,
}

impl ParticleKind {
    pub const ALL: [Self; 8] = [
        Self::VioletGlow,
        Self::SoftBlue,
        Self::WarmAmber,
        Self::Dim,
        Self::Spark,
        Self::Shadow,
        Self::Eclipse,
        Self::Proximate,
    ];

    pub const fn velocity(self) -> i32 {
        match self {
            Self::VioletGlow => 6,
            Self::Eclipse => 5,
            Self::SoftBlue => 4,
            Self::WarmAmber | Self::Spark => 3,
            Self::Dim | Self::Shadow => 2,
            Self::Proximate => 0,
        }
    }

    pub const fn color(self) -> Rgb {
        match self {
            Self::VioletGlow => rgb_from_u32(0x46_0A_5A),
            Self::SoftBlue => rgb_from_u32(0x0A_0A_55),
            Self::WarmAmber => rgb_from_u32(0x3C_1E_05),
            Self::Dim => rgb_from_u32(0x05_05_0A),
            Self::Spark => rgb_from_u32(0x50_50_50),
            Self::Shadow => rgb_from_u32(0x0A_0A_14),
            Self::Eclipse => rgb_from_u32(0x14_14_28),
            Self::Proximate => rgb_from_u32(0xFF_C8_96),
        }
    }

    pub const fn update_rule(self) -> UpdateRule {
        match self {
            Self::Proximate => UpdateRule::Reactive,
            _ => UpdateRule::Drift,
        }
    }

    pub const fn render_rule(self) -> RenderRule {
        match self {
            Self::VioletGlow => RenderRule::Sweep,
            Self::Spark => RenderRule::Brighten,
            Self::Eclipse => RenderRule::Darken,
            Self::Shadow => RenderRule::DarkenSmooth,
            Self::SoftBlue | Self::WarmAmber | Self::Dim | Self::Proximate => {
                RenderRule::BrightenSmooth
            }
        }
    }

    /// Create a particle of this kind
    ///
    /// Rejects positions outside the environment.
    pub const fn spawn(
        self,
        position: i32,
        life: i32,
        environment: Environment,
    ) -> Result<Particle, SpawnError> {
        match environment.check(position) {
            Ok(position) => Ok(Particle {
                velocity: self.velocity(),
                position,
                intensity: 1.0,
                life,
                color: self.color(),
                update: self.update_rule(),
                render: self.render_rule(),
            }),
            Err(err) => Err(err),
        }
    }
}

/// A moving point light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Environment positions per tick
    pub velocity: i32,
    /// Environment coordinate
    pub position: i32,
    /// Brightness multiplier (0.0-1.0)
    pub intensity: f32,
    /// Remaining life; the particle is dead at zero or below
    pub life: i32,
    pub color: Rgb,
    pub update: UpdateRule,
    pub render: RenderRule,
}

impl Particle {
    pub const fn is_alive(&self) -> bool {
        self.life > 0
    }

    /// Advance the particle by one tick
    ///
    /// Sets `life` to 0 when the update rule's removal predicate holds.
    pub fn update(&mut self, environment: Environment) {
        self.position = self.position.saturating_add(self.velocity);

        if self.update == UpdateRule::Reactive {
            self.life = self.life.saturating_sub(1);
            self.intensity = (self.intensity - REACTIVE_DECAY).max(0.0);
        }

        if self.update.removal().applies(self, environment) {
            self.life = 0;
        }
    }
}
