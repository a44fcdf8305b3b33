use serialport::SerialPort;
use std::io::{self, Read};
use std::time::Duration;
use telemetry_core::{Result, TelemetryError};
use tracing::{debug, warn};

/// Largest single read from the link.
const READ_CHUNK: usize = 1024;
/// A partial line longer than this is discarded as noise.
const MAX_PARTIAL_LINE: usize = 4096;

/// Byte source behind a [`Connection`].
///
/// Implemented for real serial ports; tests substitute an in-memory link.
pub trait SerialLink: Read + Send {
    /// Bytes that can be read right now without blocking.
    fn bytes_available(&mut self) -> io::Result<u32>;
}

impl SerialLink for Box<dyn SerialPort> {
    fn bytes_available(&mut self) -> io::Result<u32> {
        self.bytes_to_read().map_err(io::Error::from)
    }
}

/// An open telemetry link.
///
/// Owned by the controller and passed to each poll; the port is closed when
/// the connection is dropped.  Bytes that do not yet end in a newline are
/// kept until a later poll completes the line.
pub struct Connection<L: SerialLink = Box<dyn SerialPort>> {
    port_name: String,
    link:      L,
    pending:   Vec<u8>,
}

impl Connection {
    /// Open `port_name` as 8N1 at `baud_rate`.
    pub fn open(port_name: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(read_timeout)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .open()
            .map_err(|e| TelemetryError::Serial(format!("cannot open '{port_name}': {e}")))?;

        Ok(Self::from_link(port_name, port))
    }
}

impl<L: SerialLink> Connection<L> {
    pub fn from_link(port_name: impl Into<String>, link: L) -> Self {
        Self {
            port_name: port_name.into(),
            link,
            pending: Vec::new(),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Read everything that was waiting when the poll started and return the
    /// complete lines, oldest first, trimmed and with empty lines skipped.
    ///
    /// Returns immediately with no lines when nothing is waiting.
    pub fn poll_lines(&mut self) -> Result<Vec<String>> {
        let mut remaining = self.link.bytes_available()? as usize;
        let mut buf = [0u8; READ_CHUNK];

        while remaining > 0 {
            let want = remaining.min(READ_CHUNK);
            let n = match self.link.read(&mut buf[..want]) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => 0,
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                break;
            }
            self.pending.extend_from_slice(&buf[..n]);
            remaining = remaining.saturating_sub(n);
        }

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            if !line.is_empty() {
                lines.push(line);
            }
        }

        if self.pending.len() > MAX_PARTIAL_LINE {
            warn!(
                port = %self.port_name,
                bytes = self.pending.len(),
                "Discarding oversized partial line"
            );
            self.pending.clear();
        }

        Ok(lines)
    }

    /// Bytes held back waiting for a newline.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl<L: SerialLink> Drop for Connection<L> {
    fn drop(&mut self) {
        debug!(port = %self.port_name, "Serial connection closed");
    }
}

impl<L: SerialLink> std::fmt::Debug for Connection<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("port_name", &self.port_name)
            .field("pending", &self.pending.len())
            .finish()
    }
}
