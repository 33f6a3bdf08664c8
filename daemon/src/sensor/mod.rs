//! Stream-backed sensor sources
//!
//! Both the serial distance sensors and the stdin frame source deliver a
//! byte stream of delimited JSON frames. A reader thread parses them into
//! [`SharedReadings`]; the clock only ever sees snapshots.

mod frame;

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use sequential_light::{
    ConnectionStatus, Environment, SensorAdapter, SensorError, SensorLayout, SensorReadings,
    SharedReadings,
};
use tracing::{debug, info, warn};

pub use frame::parse_frame;

/// Serial frames are separated by this byte
pub const SERIAL_DELIMITER: u8 = b'|';

/// Poll interval of the serial reader, bounds how long a disconnect waits
const SERIAL_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Where the frames come from
#[derive(Debug, Clone)]
pub enum StreamSource {
    Serial { path: String, baud: u32 },
    Stdin,
}

impl StreamSource {
    fn delimiter(&self) -> u8 {
        match self {
            Self::Serial { .. } => SERIAL_DELIMITER,
            Self::Stdin => b'\n',
        }
    }

    fn open(&self) -> Result<Box<dyn Read>, SensorError> {
        match self {
            Self::Serial { path, baud } => {
                let port = serialport::new(path, *baud)
                    .timeout(SERIAL_READ_TIMEOUT)
                    .open()
                    .map_err(|err| {
                        debug!(path = %path, error = %err, "Serial port unavailable");
                        SensorError::Connection
                    })?;
                Ok(Box::new(port))
            }
            Self::Stdin => Ok(Box::new(io::stdin().lock())),
        }
    }
}

/// Sensor adapter reading delimited JSON frames on a background thread
pub struct StreamSensor {
    source: StreamSource,
    layout: SensorLayout,
    shared: Arc<SharedReadings>,
    stop: Arc<AtomicBool>,
}

impl StreamSensor {
    pub fn new(source: StreamSource, count: usize, environment: Environment) -> Self {
        Self {
            source,
            layout: SensorLayout::new(count, environment),
            shared: Arc::new(SharedReadings::new()),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn serial(path: &str, baud: u32, count: usize, environment: Environment) -> Self {
        let source = StreamSource::Serial {
            path: path.to_owned(),
            baud,
        };
        Self::new(source, count, environment)
    }

    pub fn stdin(count: usize, environment: Environment) -> Self {
        Self::new(StreamSource::Stdin, count, environment)
    }
}

impl SensorAdapter for StreamSensor {
    fn initialize(&mut self) -> usize {
        self.shared.reset(self.layout.count());
        self.layout.count()
    }

    fn connect(&mut self) {
        if matches!(
            self.shared.status(),
            ConnectionStatus::Open | ConnectionStatus::Connecting
        ) {
            return;
        }

        self.shared.set_status(ConnectionStatus::Connecting);
        self.stop = Arc::new(AtomicBool::new(false));

        let source = self.source.clone();
        let shared = Arc::clone(&self.shared);
        let stop = Arc::clone(&self.stop);
        let spawned = thread::Builder::new()
            .name("sensor-reader".into())
            .spawn(move || run_reader(&source, &shared, &stop));

        if let Err(err) = spawned {
            warn!(error = %err, "Failed to start sensor reader");
            self.shared.set_status(ConnectionStatus::Failed);
        }
    }

    fn status(&self) -> ConnectionStatus {
        self.shared.status()
    }

    /// Snapshot the readings of the configured sensors
    ///
    /// Frames may carry indices past the layout; those have no position.
    fn update(&mut self, readings: &mut SensorReadings) {
        self.shared.snapshot(readings);
        readings.truncate(self.layout.count());
    }

    fn position(&self, sensor: usize) -> i32 {
        self.layout.position(sensor)
    }

    fn disconnect(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        self.shared.set_status(ConnectionStatus::Closed);
    }
}

/// Body of the reader thread
fn run_reader(source: &StreamSource, shared: &SharedReadings, stop: &AtomicBool) {
    let reader = match source.open() {
        Ok(reader) => reader,
        Err(err) => {
            warn!(?source, error = %err, "Sensor connection failed");
            shared.set_status(ConnectionStatus::Failed);
            return;
        }
    };

    info!(?source, "Sensor connection open");
    shared.set_status(ConnectionStatus::Open);

    match read_frames(reader, source.delimiter(), shared, stop) {
        Ok(()) => debug!("Sensor reader stopped"),
        Err(err) => {
            warn!(error = %err, "Sensor stream ended");
            if !stop.load(Ordering::SeqCst) {
                shared.set_status(ConnectionStatus::Failed);
            }
        }
    }
}

/// Read delimited frames until stopped, EOF, or an I/O error
///
/// A parsed frame replaces all readings. Malformed frames are dropped and
/// the previous readings kept.
fn read_frames<R: Read>(
    reader: R,
    delimiter: u8,
    shared: &SharedReadings,
    stop: &AtomicBool,
) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut frame = Vec::new();

    while !stop.load(Ordering::SeqCst) {
        match reader.read_until(delimiter, &mut frame) {
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(_) => {
                let complete = frame.last() == Some(&delimiter);
                if complete {
                    frame.pop();
                }
                store_frame(&frame, shared);
                frame.clear();
                if !complete {
                    return Err(io::ErrorKind::UnexpectedEof.into());
                }
            }
            // Partial data stays in `frame` until the delimiter arrives
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

fn store_frame(bytes: &[u8], shared: &SharedReadings) {
    let Ok(text) = std::str::from_utf8(bytes) else {
        warn!("Dropping non UTF-8 sensor frame");
        return;
    };
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    match parse_frame(text) {
        Ok(pairs) => {
            shared.store_frame(pairs);
        }
        Err(err) => warn!(error = %err, frame = text, "Dropping sensor frame"),
    }
}
