use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sequential_light::SimulationConfig;

use crate::opc::{DEFAULT_HOST, DEFAULT_PORT, OpcOptions};

/// Where proximity readings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SensorSource {
    /// Distance sensors on a serial port
    Serial,
    /// Newline-delimited JSON frames on standard input
    Stdin,
    /// Built-in visitor walking past the sensors
    Synthetic,
}

#[derive(Debug, Parser)]
#[command(name = "sequential-light")]
#[command(about = "Particle light simulation for addressable LED strips", long_about = None)]
pub struct Cli {
    /// JSON simulation config; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// OPC server host
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// OPC server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// OPC channel
    #[arg(long, default_value_t = 0)]
    pub channel: u8,

    /// Per-frame transmit timeout
    #[arg(long, default_value_t = 20)]
    pub frame_timeout_ms: u64,

    /// Sensor source
    #[arg(short, long, value_enum, default_value_t = SensorSource::Serial)]
    pub sensor: SensorSource,

    /// Serial device of the distance sensors
    #[arg(long, default_value = "/dev/ttyArduino")]
    pub serial_port: String,

    #[arg(long, default_value_t = 115_200)]
    pub baud: u32,

    /// Number of sensors reported by the source
    #[arg(long, default_value_t = 24)]
    pub sensors: usize,

    /// Ambient particles only
    #[arg(long)]
    pub no_sensors: bool,

    /// Log the readings vector every tick
    #[arg(long)]
    pub echo_readings: bool,

    /// Log the position of every proximate spawn
    #[arg(long)]
    pub echo_positions: bool,

    /// Write the process id here while running
    #[arg(long)]
    pub pid_file: Option<PathBuf>,

    #[arg(long)]
    pub pixels: Option<usize>,

    #[arg(long)]
    pub scale: Option<usize>,

    #[arg(long)]
    pub particles: Option<usize>,
}

impl Cli {
    /// Load the config file (if any), apply overrides and validate
    pub fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => SimulationConfig::default(),
        };

        if let Some(pixels) = self.pixels {
            config.pixel_length = pixels;
        }
        if let Some(scale) = self.scale {
            config.scale_factor = scale;
        }
        if let Some(particles) = self.particles {
            config.particle_count = particles;
        }

        config.environment().context("invalid simulation config")?;
        Ok(config)
    }

    pub fn opc_options(&self) -> OpcOptions {
        OpcOptions {
            host: self.host.clone(),
            port: self.port,
            channel: self.channel,
            frame_timeout: Duration::from_millis(self.frame_timeout_ms),
            ..OpcOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sequential-light").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.sensor, SensorSource::Serial);
        assert_eq!(cli.serial_port, "/dev/ttyArduino");
        assert_eq!(cli.port, 7890);
        assert_eq!(cli.simulation_config().unwrap(), SimulationConfig::default());
    }

    #[test]
    fn test_flag_overrides() {
        let cli = parse(&["--pixels", "60", "--scale", "4", "--particles", "10", "--sensor", "synthetic"]);
        let config = cli.simulation_config().unwrap();
        assert_eq!(config.pixel_length, 60);
        assert_eq!(config.scale_factor, 4);
        assert_eq!(config.particle_count, 10);
        assert_eq!(cli.sensor, SensorSource::Synthetic);
    }

    #[test]
    fn test_config_file_then_flags() {
        let path = std::env::temp_dir().join(format!("sequential-light-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"pixel_length": 120, "ambient": [0, 0, 0], "tick_period_ms": 15}}"#).unwrap();
        drop(file);

        let cli = parse(&["--config", path.to_str().unwrap(), "--pixels", "90"]);
        let config = cli.simulation_config().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.pixel_length, 90);
        assert_eq!(config.ambient, [0, 0, 0]);
        assert_eq!(config.tick_period_ms, 15);
        assert_eq!(config.scale_factor, 7);
    }

    #[test]
    fn test_invalid_geometry_is_rejected() {
        assert!(parse(&["--scale", "0"]).simulation_config().is_err());
    }

    #[test]
    fn test_unknown_sensor_source() {
        let args = ["sequential-light", "--sensor", "sonar"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
