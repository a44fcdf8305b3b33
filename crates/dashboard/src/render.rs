use serde_json::{json, Map, Value};
use std::io::{self, Write};
use telemetry_core::{event::Message, AppState, LinkStatus, StateView};
use tracing::warn;

/// Prints the channel labels as one status line whenever they change.
///
/// ```text
/// [/dev/ttyACM0] Temperature: 23.5 °C | Humidity: 40.2 % | Power: 5.01 W | Light: 512
/// ```
pub struct LabelView<W: Write> {
    out: W,
}

impl LabelView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> LabelView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, state: &AppState) {
        let link = match &state.link {
            LinkStatus::Connected(port) => port.as_str(),
            LinkStatus::Disconnected    => "not connected",
        };
        let mut line = format!("[{link}] {}", state.labels().join(" | "));
        if let Some(at) = state.last_update {
            line.push_str(&format!(" (updated {})", at.format("%H:%M:%S")));
        }
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!("Cannot write labels: {e}");
        }
    }

    /// One line per displayed channel with the range held in its history.
    fn print_trend(&mut self, state: &AppState) {
        for &channel in &state.channels {
            let snapshot = state.history.snapshot(channel);
            let Some((lo, hi)) = snapshot.range() else {
                continue;
            };
            let unit = channel.display_unit();
            let result = writeln!(
                self.out,
                "{}: {} points, min {lo}{unit}, max {hi}{unit}",
                channel.title(),
                snapshot.values.len(),
            );
            if let Err(e) = result {
                warn!("Cannot write trend: {e}");
                return;
            }
        }
    }
}

impl<W: Write> StateView for LabelView<W> {
    fn id(&self) -> &str {
        "labels"
    }

    fn on_message(&mut self, message: &Message, state: &AppState) {
        match message {
            Message::SampleDecoded(_) | Message::LinkChanged(_) | Message::ConfigReloaded => {
                self.print(state)
            }
            Message::Shutdown => self.print_trend(state),
            Message::LineRejected { .. } | Message::Tick => {}
        }
    }
}

impl<W: Write> std::fmt::Debug for LabelView<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelView").finish_non_exhaustive()
    }
}

/// Writes one JSON object per decoded sample.
///
/// ```text
/// {"seq":1,"tick":0,"time":"2026-10-19T12:00:01+02:00","temperature":23.5,"humidity":40.2}
/// ```
pub struct JsonView<W: Write> {
    out: W,
}

impl JsonView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// JSON record for the sample that was just applied to `state`.
pub fn sample_record(sample: &telemetry_core::Sample, state: &AppState) -> Value {
    let mut record = Map::new();
    record.insert("seq".into(), json!(state.samples_decoded));
    if let Some(tick) = state.history.last_tick() {
        record.insert("tick".into(), json!(tick));
    }
    if let Some(at) = state.last_update {
        record.insert("time".into(), json!(at.to_rfc3339()));
    }
    for (channel, value) in sample.readings() {
        let key = serde_json::to_value(channel)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| channel.title().to_lowercase());
        record.insert(key, json!(value));
    }
    Value::Object(record)
}

impl<W: Write> StateView for JsonView<W> {
    fn id(&self) -> &str {
        "json"
    }

    fn on_message(&mut self, message: &Message, state: &AppState) {
        if let Message::SampleDecoded(sample) = message {
            let record = sample_record(sample, state);
            if let Err(e) = writeln!(self.out, "{record}") {
                warn!("Cannot write sample: {e}");
            }
        }
    }
}

impl<W: Write> std::fmt::Debug for JsonView<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonView").finish_non_exhaustive()
    }
}
