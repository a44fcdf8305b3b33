use crate::history::{History, DEFAULT_CAPACITY};
use crate::sample::{Channel, Sample};
use chrono::{DateTime, Local};

/// Central application state — every view reads from this.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Serial link as seen by the controller.
    pub link: LinkStatus,
    /// Channels the active line format carries, in display order.
    pub channels: Vec<Channel>,
    /// Last displayed value per channel.  Survives malformed lines.
    latest: [Option<f64>; 4],
    /// Bounded per-channel history for plotting.
    pub history: History,
    /// Wall-clock time of the last accepted sample.
    pub last_update: Option<DateTime<Local>>,
    /// Lines decoded into samples since startup.
    pub samples_decoded: u64,
    /// Lines dropped as malformed since startup.
    pub lines_rejected: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

/// Whether a serial connection is currently held.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkStatus {
    /// No port was found or the open failed; labels stay at `N/A`.
    #[default]
    Disconnected,
    /// Connected to the named port.
    Connected(String),
}

impl AppState {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            link: LinkStatus::Disconnected,
            channels: Channel::ALL.to_vec(),
            latest: [None; 4],
            history: History::new(capacity),
            last_update: None,
            samples_decoded: 0,
            lines_rejected: 0,
        }
    }

    /// Fold a freshly decoded sample into the display values and history.
    pub fn apply(&mut self, sample: &Sample) {
        for (channel, value) in sample.readings() {
            self.latest[channel.index()] = Some(value);
        }
        self.history.record(sample);
        self.last_update = Some(Local::now());
        self.samples_decoded += 1;
    }

    /// Count a dropped line; displayed values are left untouched.
    pub fn reject(&mut self) {
        self.lines_rejected += 1;
    }

    #[must_use]
    pub fn latest(&self, channel: Channel) -> Option<f64> {
        self.latest[channel.index()]
    }

    /// Label text for a channel, e.g. `"Temperature: 23.5 °C"` or
    /// `"Temperature: N/A"` before the first reading.
    pub fn label(&self, channel: Channel) -> String {
        match self.latest(channel) {
            Some(value) => format_reading(channel, value),
            None => format!("{}: N/A", channel.title()),
        }
    }

    /// Labels of every displayed channel, in order.
    pub fn labels(&self) -> Vec<String> {
        self.channels.iter().map(|&c| self.label(c)).collect()
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.link, LinkStatus::Connected(_))
    }
}

/// Format one reading the way the dashboard labels show it.
pub fn format_reading(channel: Channel, value: f64) -> String {
    match channel.display_unit() {
        ""   => format!("{}: {value}", channel.title()),
        unit => format!("{}: {value} {unit}", channel.title()),
    }
}
