use serialport::{SerialPortInfo, SerialPortType};
use telemetry_core::{Result, TelemetryError};
use tracing::debug;

/// A port as seen by discovery: its device path and, for USB devices, a
/// human-readable description built from the product and manufacturer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortCandidate {
    pub path:        String,
    pub description: Option<String>,
}

impl From<SerialPortInfo> for PortCandidate {
    fn from(info: SerialPortInfo) -> Self {
        let description = match info.port_type {
            SerialPortType::UsbPort(usb) => {
                let parts: Vec<String> = [usb.product, usb.manufacturer]
                    .into_iter()
                    .flatten()
                    .collect();
                (!parts.is_empty()).then(|| parts.join(" - "))
            }
            _ => None,
        };
        Self {
            path: info.port_name,
            description,
        }
    }
}

/// Substrings that identify the telemetry board.
#[derive(Debug, Clone, Default)]
pub struct PortMatcher {
    /// Matched against the description, e.g. `"Arduino"`.
    pub description_markers: Vec<String>,
    /// Matched against the device path, e.g. `"usbmodem"` on macOS.
    pub path_markers: Vec<String>,
}

impl PortMatcher {
    pub fn matches(&self, candidate: &PortCandidate) -> bool {
        let by_description = candidate.description.as_deref().is_some_and(|d| {
            self.description_markers.iter().any(|m| d.contains(m.as_str()))
        });
        let by_path = self
            .path_markers
            .iter()
            .any(|m| candidate.path.contains(m.as_str()));
        by_description || by_path
    }
}

/// First candidate the matcher accepts, in enumeration order.
pub fn find_port<'a>(candidates: &'a [PortCandidate], matcher: &PortMatcher) -> Option<&'a PortCandidate> {
    candidates.iter().find(|c| matcher.matches(c))
}

/// Enumerate the serial ports present right now.
pub fn list_ports() -> Result<Vec<PortCandidate>> {
    let ports = serialport::available_ports()
        .map_err(|e| TelemetryError::Serial(format!("cannot enumerate ports: {e}")))?;
    Ok(ports.into_iter().map(PortCandidate::from).collect())
}

/// Scan the live port list once and return the matching device path.
pub fn discover(matcher: &PortMatcher) -> Result<Option<String>> {
    let candidates = list_ports()?;
    debug!(count = candidates.len(), "Enumerated serial ports");
    Ok(find_port(&candidates, matcher).map(|c| c.path.clone()))
}
