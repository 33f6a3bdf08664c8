//! Simulation clock
//!
//! Drives the tick pipeline without async/await or platform timers. The
//! caller passes the current time to [`SimulationClock::tick`] and sleeps
//! until the returned deadline.
//!
//! ```ignore
//! let mut clock = SimulationClock::new(&config, sensor, sink, rng)?;
//! clock.start();
//!
//! loop {
//!     let now = Instant::now();
//!     let result = clock.tick(now);
//!     sleep_until(result.next_deadline);
//! }
//! ```

use embassy_time::{Duration, Instant};
use rand::Rng;

use crate::PixelSink;
use crate::compositor::Compositor;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, SinkError};
use crate::pool::{ParticlePool, SpawnReport};
use crate::sensor::{ConnectionStatus, MAX_SENSORS, SensorAdapter, SensorReadings};
use crate::tables::CoordinateTables;

/// Connection state of the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// Waiting for the sensor; `retry_at` is set while a retry is scheduled
    Disconnected { retry_at: Option<Instant> },
    /// Running the tick pipeline
    Running,
}

/// What happened to the frame of a running tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Sent,
    Dropped(SinkError),
}

/// What a tick did
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// No frame was produced
    Disconnected {
        /// A reconnect attempt was started during this tick
        attempted: bool,
        /// A retry is scheduled for a later tick
        retry_pending: bool,
    },
    /// The full pipeline ran
    Rendered {
        /// Pool size after the sweep
        particles: usize,
        spawned: SpawnReport,
        frame: FrameStatus,
    },
}

/// Result of a clock tick
#[derive(Debug, Clone)]
pub struct TickResult {
    /// When the next tick should run
    pub next_deadline: Instant,
    pub outcome: TickOutcome,
}

impl TickResult {
    /// How long to wait from `now` until the next tick (zero if late)
    pub fn sleep_from(&self, now: Instant) -> Duration {
        self.next_deadline
            .checked_duration_since(now)
            .unwrap_or(Duration::from_millis(0))
    }
}

/// `now + period`, saturating at the end of time
fn deadline(now: Instant, period: Duration) -> Instant {
    now.checked_add(period).unwrap_or(Instant::MAX)
}

/// Fixed-period driver of the simulation
///
/// Owns the pool, tables and compositor, and the sensor and sink
/// connections. Exactly one tick runs at a time.
pub struct SimulationClock<S: SensorAdapter, P: PixelSink, R: Rng> {
    // External dependencies and configuration
    sensor: S,
    sink: P,
    rng: R,
    tick_period: Duration,
    retry_backoff: Duration,

    // Internal state
    state: ClockState,
    readings: SensorReadings,
    pool: ParticlePool,

    // Rendering
    tables: CoordinateTables,
    compositor: Compositor,
}

impl<S: SensorAdapter, P: PixelSink, R: Rng> SimulationClock<S, P, R> {
    /// Validate the configuration, build the tables and initialize the sensor
    pub fn new(
        config: &SimulationConfig,
        mut sensor: S,
        sink: P,
        rng: R,
    ) -> Result<Self, ConfigError> {
        let environment = config.environment()?;
        let count = sensor.initialize();
        if count > MAX_SENSORS {
            return Err(ConfigError::TooManySensors {
                count,
                max: MAX_SENSORS,
            });
        }

        Ok(Self {
            sensor,
            sink,
            rng,
            tick_period: config.tick_period(),
            retry_backoff: config.retry_backoff(),
            state: ClockState::Disconnected { retry_at: None },
            readings: SensorReadings::with_count(count),
            pool: ParticlePool::new(
                environment,
                config.particle_count,
                config.proximity_threshold,
            ),
            tables: CoordinateTables::build(environment),
            compositor: Compositor::new(environment, config.ambient_color()),
        })
    }

    /// Replace the particle pool (custom spawn tables, seeded scenes)
    #[must_use]
    pub fn with_pool(mut self, pool: ParticlePool) -> Self {
        self.pool = pool;
        self
    }

    /// Make the first connection attempt
    pub fn start(&mut self) {
        #[cfg(feature = "log")]
        tracing::info!("Connecting sensors");
        self.sensor.connect();
    }

    /// Run one tick
    pub fn tick(&mut self, now: Instant) -> TickResult {
        let outcome = match self.state {
            ClockState::Disconnected { retry_at } => self.tick_disconnected(now, retry_at),
            ClockState::Running => self.tick_running(),
        };

        TickResult {
            next_deadline: deadline(now, self.tick_period),
            outcome,
        }
    }

    /// Wait for the sensor, retrying after the backoff
    fn tick_disconnected(&mut self, now: Instant, retry_at: Option<Instant>) -> TickOutcome {
        let status = self.sensor.status();
        if status == ConnectionStatus::Open {
            #[cfg(feature = "log")]
            tracing::info!("Sensor connection open, starting simulation");
            self.state = ClockState::Running;
            return self.tick_running();
        }

        let mut attempted = false;
        let retry_at = match retry_at {
            // An attempt in progress counts as the one retry in flight
            None if status == ConnectionStatus::Connecting => None,
            None => {
                #[cfg(feature = "log")]
                tracing::debug!(
                    backoff_ms = self.retry_backoff.as_millis(),
                    "Scheduling sensor retry"
                );
                Some(deadline(now, self.retry_backoff))
            }
            Some(at) if now >= at => {
                #[cfg(feature = "log")]
                tracing::info!("Retrying sensor connection");
                self.sensor.connect();
                attempted = true;
                None
            }
            pending => pending,
        };

        self.state = ClockState::Disconnected { retry_at };
        TickOutcome::Disconnected {
            attempted,
            retry_pending: retry_at.is_some(),
        }
    }

    /// Spawn, update, render, transmit
    fn tick_running(&mut self) -> TickOutcome {
        if self.sensor.status() != ConnectionStatus::Open {
            #[cfg(feature = "log")]
            tracing::warn!(status = ?self.sensor.status(), "Sensor connection lost");
            self.state = ClockState::Disconnected { retry_at: None };
            return TickOutcome::Disconnected {
                attempted: false,
                retry_pending: false,
            };
        }

        self.sensor.update(&mut self.readings);

        let sensor = &self.sensor;
        let spawned = self
            .pool
            .replenish(&mut self.rng, &self.readings, |index| sensor.position(index));
        self.pool.update();

        self.compositor.render(self.pool.particles(), &self.tables);
        let frame = self.transmit();

        TickOutcome::Rendered {
            particles: self.pool.len(),
            spawned,
            frame,
        }
    }

    /// Hand the frame to the sink, last logical pixel first
    fn transmit(&mut self) -> FrameStatus {
        let last = self.compositor.pixel_length() - 1;
        for (index, color) in self.compositor.pixels().enumerate() {
            self.sink.set_pixel(last - index, color);
        }

        match self.sink.flush() {
            Ok(()) => FrameStatus::Sent,
            Err(err) => {
                #[cfg(feature = "log")]
                tracing::debug!(error = %err, "Dropped frame");
                FrameStatus::Dropped(err)
            }
        }
    }

    /// Disconnect the sensor and close the sink
    pub fn shutdown(&mut self) {
        #[cfg(feature = "log")]
        tracing::info!("Stopping simulation clock");
        self.sensor.disconnect();
        self.sink.close();
        self.state = ClockState::Disconnected { retry_at: None };
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn readings(&self) -> &SensorReadings {
        &self.readings
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn tables(&self) -> &CoordinateTables {
        &self.tables
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut P {
        &mut self.sink
    }
}
