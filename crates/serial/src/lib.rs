pub mod connection;
pub mod discovery;

pub use connection::{Connection, SerialLink};
pub use discovery::{discover, find_port, list_ports, PortCandidate, PortMatcher};

use std::time::Duration;
use telemetry_core::{Result, TelemetryError};
use tracing::info;

/// Everything needed to pick and open the telemetry port.
#[derive(Debug, Clone)]
pub struct LinkSettings {
    /// Explicit device path; discovery is skipped when set.
    pub port:         Option<String>,
    pub baud_rate:    u32,
    pub read_timeout: Duration,
    pub matcher:      PortMatcher,
}

/// Resolve the port (explicit or discovered) and open it.
///
/// Discovery runs exactly once; a missing port is reported as
/// [`TelemetryError::Serial`] and not retried.
pub fn establish(settings: &LinkSettings) -> Result<Connection> {
    let port_name = match &settings.port {
        Some(port) => port.clone(),
        None => discover(&settings.matcher)?.ok_or_else(|| {
            TelemetryError::Serial("no serial port matches the configured markers".into())
        })?,
    };

    let connection = Connection::open(&port_name, settings.baud_rate, settings.read_timeout)?;
    info!(port = %port_name, baud = settings.baud_rate, "Connected to telemetry device");
    Ok(connection)
}
