//! Open Pixel Control client
//!
//! Each frame is one "set pixel colors" message:
//! `[channel, 0x00, len_hi, len_lo, r, g, b, r, g, b, ...]`.

use std::io::{self, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use anyhow::Context;
use sequential_light::{PixelSink, Rgb, SinkError};
use tracing::{debug, info, warn};

const HEADER_LEN: usize = 4;
const SET_PIXEL_COLORS: u8 = 0x00;

/// Most pixels one message can address with its 16-bit length
pub const MAX_PIXELS: usize = u16::MAX as usize / 3;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 7890;
pub const DEFAULT_FRAME_TIMEOUT: Duration = Duration::from_millis(20);
pub const DEFAULT_RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

/// Connection settings of an [`OpcClient`]
#[derive(Debug, Clone)]
pub struct OpcOptions {
    pub host: String,
    pub port: u16,
    pub channel: u8,
    /// Bounds both connecting and writing one frame
    pub frame_timeout: Duration,
    pub reconnect_backoff: Duration,
}

impl Default for OpcOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            channel: 0,
            frame_timeout: DEFAULT_FRAME_TIMEOUT,
            reconnect_backoff: DEFAULT_RECONNECT_BACKOFF,
        }
    }
}

/// Pixel sink sending frames to an OPC server over TCP
///
/// The connection is opened lazily on flush and reopened after a backoff
/// when it breaks. Frames sent while disconnected are dropped.
pub struct OpcClient {
    options: OpcOptions,
    message: Vec<u8>,
    stream: Option<TcpStream>,
    retry_at: Option<Instant>,
}

impl OpcClient {
    /// Fails if the strip does not fit a single message
    pub fn new(options: OpcOptions, pixel_length: usize) -> anyhow::Result<Self> {
        let payload = pixel_length
            .checked_mul(3)
            .and_then(|len| u16::try_from(len).ok())
            .with_context(|| {
                format!("{pixel_length} pixels exceed the OPC limit of {MAX_PIXELS}")
            })?;

        let mut message = vec![0; HEADER_LEN + usize::from(payload)];
        message[0] = options.channel;
        message[1] = SET_PIXEL_COLORS;
        message[2..HEADER_LEN].copy_from_slice(&payload.to_be_bytes());

        Ok(Self {
            options,
            message,
            stream: None,
            retry_at: None,
        })
    }

    /// The message the next flush sends
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn connect(&mut self) -> Result<(), SinkError> {
        if self.stream.is_some() {
            return Ok(());
        }
        if self.retry_at.is_some_and(|at| Instant::now() < at) {
            return Err(SinkError::Disconnected);
        }

        match self.open() {
            Ok(stream) => {
                info!(host = %self.options.host, port = self.options.port, "Connected to OPC server");
                self.stream = Some(stream);
                self.retry_at = None;
                Ok(())
            }
            Err(err) => {
                warn!(
                    host = %self.options.host,
                    port = self.options.port,
                    error = %err,
                    "OPC connection failed"
                );
                self.retry_at = Some(Instant::now() + self.options.reconnect_backoff);
                Err(SinkError::Disconnected)
            }
        }
    }

    fn open(&self) -> io::Result<TcpStream> {
        let address = (self.options.host.as_str(), self.options.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no address for host"))?;

        let stream = TcpStream::connect_timeout(&address, self.options.frame_timeout)?;
        stream.set_write_timeout(Some(self.options.frame_timeout))?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    /// Forget a broken connection and schedule a reconnect
    fn drop_stream(&mut self) {
        self.stream = None;
        self.retry_at = Some(Instant::now() + self.options.reconnect_backoff);
    }
}

impl PixelSink for OpcClient {
    fn set_pixel(&mut self, index: usize, color: Rgb) {
        let offset = HEADER_LEN + index * 3;
        if let Some(slot) = self.message.get_mut(offset..offset + 3) {
            slot.copy_from_slice(&[color.r, color.g, color.b]);
        }
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.connect()?;
        let Some(stream) = self.stream.as_mut() else {
            return Err(SinkError::Disconnected);
        };

        match stream.write_all(&self.message) {
            Ok(()) => Ok(()),
            // A partial write leaves the server mid-message, so the stream is unusable
            Err(err) if matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                debug!("OPC frame timed out");
                self.drop_stream();
                Err(SinkError::Timeout {
                    timeout_ms: u64::try_from(self.options.frame_timeout.as_millis())
                        .unwrap_or(u64::MAX),
                })
            }
            Err(err) => {
                warn!(error = %err, "OPC connection lost");
                self.drop_stream();
                Err(SinkError::Disconnected)
            }
        }
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
            debug!("Closed OPC connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn test_message_layout() {
        let options = OpcOptions {
            channel: 3,
            ..OpcOptions::default()
        };
        let mut client = OpcClient::new(options, 100).unwrap();
        client.set_pixel(0, Rgb::new(1, 2, 3));
        client.set_pixel(99, Rgb::new(7, 8, 9));

        let message = client.message();
        assert_eq!(message.len(), 304);
        assert_eq!(&message[..4], &[3, 0, 1, 44]);
        assert_eq!(&message[4..7], &[1, 2, 3]);
        assert_eq!(&message[301..], &[7, 8, 9]);
    }

    #[test]
    fn test_oversized_strip_is_rejected() {
        let client = OpcClient::new(OpcOptions::default(), MAX_PIXELS).unwrap();
        assert_eq!(&client.message()[2..4], &[0xFF, 0xFF]);
        assert!(OpcClient::new(OpcOptions::default(), MAX_PIXELS + 1).is_err());
        assert!(OpcClient::new(OpcOptions::default(), usize::MAX).is_err());
    }

    #[test]
    fn test_out_of_range_pixel_is_ignored() {
        let mut client = OpcClient::new(OpcOptions::default(), 2).unwrap();
        client.set_pixel(2, Rgb::new(255, 255, 255));
        assert!(client.message()[4..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn test_flush_sends_frame() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let options = OpcOptions {
            host: "127.0.0.1".to_owned(),
            port,
            frame_timeout: Duration::from_millis(500),
            ..OpcOptions::default()
        };
        let mut client = OpcClient::new(options, 2).unwrap();
        client.set_pixel(1, Rgb::new(10, 20, 30));
        client.flush().unwrap();
        assert!(client.is_connected());

        let (mut server, _) = listener.accept().unwrap();
        let mut received = [0; 10];
        server.read_exact(&mut received).unwrap();
        assert_eq!(received, [0, 0, 0, 6, 0, 0, 0, 10, 20, 30]);

        client.close();
        assert!(!client.is_connected());
    }

    #[test]
    fn test_unreachable_server_drops_frames() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let options = OpcOptions {
            host: "127.0.0.1".to_owned(),
            port,
            ..OpcOptions::default()
        };
        let mut client = OpcClient::new(options, 4).unwrap();
        assert_eq!(client.flush(), Err(SinkError::Disconnected));
        // Backoff pending, no new attempt
        assert_eq!(client.flush(), Err(SinkError::Disconnected));
        assert!(!client.is_connected());
    }
}
