mod cli;
mod opc;
mod pid;
mod sensor;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sequential_light::{
    FrameStatus, Instant, NoSensors, SensorAdapter, SimulationClock, SimulationConfig,
    SyntheticSensor, TickOutcome,
};
use tracing::{info, warn};

use crate::cli::{Cli, SensorSource};
use crate::opc::OpcClient;
use crate::pid::PidFile;
use crate::sensor::StreamSensor;

/// Dropped frames are reported once per this many
const DROPPED_FRAME_REPORT_INTERVAL: u64 = 100;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.simulation_config()?;
    let environment = config.environment()?;

    let _pid_file = cli
        .pid_file
        .as_deref()
        .map(PidFile::create)
        .transpose()
        .context("writing PID file")?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("installing Ctrl-C handler")?;

    let sink = OpcClient::new(cli.opc_options(), config.pixel_length)?;

    info!(
        pixels = config.pixel_length,
        scale = config.scale_factor,
        particles = config.particle_count,
        host = %cli.host,
        port = cli.port,
        "Starting sequential light"
    );

    if cli.no_sensors {
        return run(&cli, &config, NoSensors, sink, &running);
    }

    match cli.sensor {
        SensorSource::Serial => {
            let sensor = StreamSensor::serial(&cli.serial_port, cli.baud, cli.sensors, environment);
            run(&cli, &config, sensor, sink, &running)
        }
        SensorSource::Stdin => {
            let sensor = StreamSensor::stdin(cli.sensors, environment);
            run(&cli, &config, sensor, sink, &running)
        }
        SensorSource::Synthetic => {
            let sensor = SyntheticSensor::new(cli.sensors, environment);
            run(&cli, &config, sensor, sink, &running)
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Drive the clock until Ctrl-C
fn run<S: SensorAdapter>(
    cli: &Cli,
    config: &SimulationConfig,
    sensor: S,
    sink: OpcClient,
    running: &AtomicBool,
) -> Result<()> {
    let rng = SmallRng::from_entropy();
    let mut clock = SimulationClock::new(config, sensor, sink, rng)?;
    clock.start();

    let mut dropped: u64 = 0;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        let result = clock.tick(now);

        if let TickOutcome::Rendered { spawned, frame, .. } = &result.outcome {
            if cli.echo_readings {
                info!(readings = ?clock.readings().as_slice(), "Sensor readings");
            }
            if cli.echo_positions {
                for position in spawned.proximate.iter() {
                    info!(position, "Proximate spawn");
                }
            }
            if let FrameStatus::Dropped(err) = frame {
                dropped += 1;
                if dropped % DROPPED_FRAME_REPORT_INTERVAL == 1 {
                    warn!(error = %err, dropped, "Dropping frames");
                }
            }
        }

        let sleep = result.sleep_from(Instant::now());
        std::thread::sleep(std::time::Duration::from_micros(sleep.as_micros()));
    }

    info!(dropped, "Shutting down");
    clock.shutdown();
    Ok(())
}
