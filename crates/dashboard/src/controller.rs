use telemetry_config::TelemetryConfig;
use telemetry_core::{event::Message, AppState, LinkStatus, StateView};
use telemetry_protocol::{decode, LineFormat};
use telemetry_serial::{Connection, SerialLink};
use tracing::{debug, error, info, warn};

/// Owns the state, the active line format and the serial connection, and
/// drives one poll → decode → render cycle per tick.
pub struct Controller<L: SerialLink> {
    state:      AppState,
    format:     LineFormat,
    connection: Option<Connection<L>>,
    views:      Vec<Box<dyn StateView>>,
}

impl<L: SerialLink> Controller<L> {
    pub fn new(capacity: usize, format: LineFormat, views: Vec<Box<dyn StateView>>) -> Self {
        let mut state = AppState::with_capacity(capacity);
        state.channels = format.fields.iter().map(|f| f.channel).collect();
        Self {
            state,
            format,
            connection: None,
            views,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn format(&self) -> &LineFormat {
        &self.format
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Take ownership of an open connection.
    pub fn attach(&mut self, connection: Connection<L>) {
        let port = connection.port_name().to_string();
        self.connection = Some(connection);
        self.handle(Message::LinkChanged(LinkStatus::Connected(port)));
    }

    /// Release the connection, if any.
    pub fn detach(&mut self) {
        if self.connection.take().is_some() {
            self.handle(Message::LinkChanged(LinkStatus::Disconnected));
        }
    }

    /// One timer tick: drain complete lines from the link and decode each.
    ///
    /// Without a connection this only notifies the views.  A link error
    /// drops the connection for good; there is no reconnect.
    pub fn tick(&mut self) {
        self.handle(Message::Tick);

        let Some(connection) = self.connection.as_mut() else {
            return;
        };

        let lines = match connection.poll_lines() {
            Ok(lines) => lines,
            Err(e) => {
                error!(port = %connection.port_name(), "Error reading telemetry: {e}");
                self.detach();
                return;
            }
        };

        for line in lines {
            debug!(raw = %line, "Raw telemetry line");
            let message = match decode(&line, &self.format) {
                Ok(sample) => Message::SampleDecoded(sample),
                Err(e) => Message::LineRejected {
                    line,
                    reason: e.to_string(),
                },
            };
            self.handle(message);
        }
    }

    /// Apply a reloaded config.  Only the line format takes effect live.
    pub fn reload(&mut self, config: &TelemetryConfig) {
        let format = config.format.line_format();
        if format != self.format {
            info!(layout = %format.template(), "Line format updated");
            self.state.channels = format.fields.iter().map(|f| f.channel).collect();
            self.format = format;
        }
        if config.history.capacity != self.state.history.capacity() {
            warn!("history.capacity changes take effect after a restart");
        }
        self.handle(Message::ConfigReloaded);
    }

    /// Update state for `message`, then let every view react.
    pub fn handle(&mut self, message: Message) {
        match &message {
            Message::SampleDecoded(sample) => self.state.apply(sample),
            Message::LineRejected { line, reason } => {
                warn!(line = %line, "Unexpected data format: {reason}");
                self.state.reject();
            }
            Message::LinkChanged(status) => self.state.link = status.clone(),
            Message::ConfigReloaded | Message::Tick | Message::Shutdown => {}
        }

        for view in &mut self.views {
            view.on_message(&message, &self.state);
        }
    }

    /// Notify views and close the link.
    pub fn shutdown(mut self) {
        self.handle(Message::Shutdown);
        self.connection = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::{self, Read};
    use std::sync::{Arc, Mutex};
    use telemetry_core::Channel;

    #[derive(Default)]
    struct ScriptedLink {
        chunks: VecDeque<Vec<u8>>,
        broken: bool,
    }

    impl Read for ScriptedLink {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let chunk = self.chunks.pop_front().unwrap_or_default();
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    impl SerialLink for ScriptedLink {
        fn bytes_available(&mut self) -> io::Result<u32> {
            if self.broken {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
            }
            Ok(self.chunks.front().map_or(0, |c| c.len() as u32))
        }
    }

    /// Records the kind of every message it sees.
    #[derive(Debug, Default)]
    struct Recorder(Arc<Mutex<Vec<&'static str>>>);

    impl StateView for Recorder {
        fn id(&self) -> &str {
            "recorder"
        }

        fn on_message(&mut self, message: &Message, _state: &AppState) {
            let kind = match message {
                Message::SampleDecoded(_) => "sample",
                Message::LineRejected { .. } => "rejected",
                Message::LinkChanged(_) => "link",
                Message::ConfigReloaded => "reload",
                Message::Tick => "tick",
                Message::Shutdown => "shutdown",
            };
            self.0.lock().unwrap().push(kind);
        }
    }

    fn controller_with(lines: &[&str]) -> (Controller<ScriptedLink>, Arc<Mutex<Vec<&'static str>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut controller = Controller::new(
            100,
            LineFormat::labeled(),
            vec![Box::new(Recorder(log.clone()))],
        );
        let link = ScriptedLink {
            chunks: lines.iter().map(|l| l.as_bytes().to_vec()).collect(),
            broken: false,
        };
        controller.attach(Connection::from_link("/dev/fake0", link));
        (controller, log)
    }

    #[test]
    fn tick_decodes_line_into_state() {
        let (mut controller, log) = controller_with(&["Temp:23.5C,Hum:40.2%,Rail V:5.01V,Light:512\n"]);
        controller.tick();

        let state = controller.state();
        assert_eq!(state.latest(Channel::Temperature), Some(23.5));
        assert_eq!(state.latest(Channel::Light), Some(512.0));
        assert_eq!(state.link, LinkStatus::Connected("/dev/fake0".into()));
        assert_eq!(*log.lock().unwrap(), vec!["link", "tick", "sample"]);
    }

    #[test]
    fn malformed_line_keeps_previous_values() {
        let (mut controller, _) = controller_with(&[
            "Temp:23.5C,Hum:40.2%,Rail V:5.01V,Light:512\n",
            "garbage\n",
        ]);
        controller.tick();
        controller.tick();

        let state = controller.state();
        assert_eq!(state.latest(Channel::Humidity), Some(40.2));
        assert_eq!(state.lines_rejected, 1);
        assert_eq!(state.history.snapshot(Channel::Humidity).values, vec![40.2]);
    }

    #[test]
    fn idle_tick_changes_nothing() {
        let (mut controller, log) = controller_with(&[]);
        controller.tick();
        assert_eq!(controller.state().samples_decoded, 0);
        assert_eq!(*log.lock().unwrap(), vec!["link", "tick"]);
    }

    #[test]
    fn link_error_drops_connection() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut controller: Controller<ScriptedLink> =
            Controller::new(10, LineFormat::labeled(), vec![Box::new(Recorder(log.clone()))]);
        controller.attach(Connection::from_link(
            "/dev/fake0",
            ScriptedLink {
                broken: true,
                ..ScriptedLink::default()
            },
        ));

        controller.tick();
        assert!(!controller.is_connected());
        assert_eq!(controller.state().link, LinkStatus::Disconnected);

        // Further ticks are harmless.
        controller.tick();
        assert_eq!(*log.lock().unwrap(), vec!["link", "tick", "link", "tick"]);
    }

    #[test]
    fn without_connection_labels_stay_not_available() {
        let mut controller: Controller<ScriptedLink> = Controller::new(10, LineFormat::labeled(), Vec::new());
        controller.tick();
        assert_eq!(controller.state().label(Channel::Temperature), "Temperature: N/A");
    }

    #[test]
    fn reload_switches_line_format() {
        let (mut controller, _) = controller_with(&["21.0,55.5,3.3\n"]);
        let mut config = TelemetryConfig::default();
        config.format.preset = telemetry_protocol::Preset::Legacy;

        controller.reload(&config);
        controller.tick();

        assert_eq!(controller.format(), &LineFormat::legacy());
        assert_eq!(controller.state().latest(Channel::Power), Some(3.3));
        assert_eq!(
            controller.state().channels,
            vec![Channel::Temperature, Channel::Humidity, Channel::Power]
        );
    }

    #[test]
    fn format_switch_keeps_channels_on_one_tick_axis() {
        let mut controller: Controller<ScriptedLink> =
            Controller::new(100, LineFormat::legacy(), Vec::new());
        let legacy = ScriptedLink {
            chunks: VecDeque::from([b"20.0,50.0,5.0\n21.0,51.0,5.1\n22.0,52.0,5.2\n".to_vec()]),
            broken: false,
        };
        controller.attach(Connection::from_link("/dev/fake0", legacy));
        controller.tick();

        let mut config = TelemetryConfig::default();
        config.format.preset = telemetry_protocol::Preset::Labeled;
        controller.reload(&config);
        controller.detach();
        let labeled = ScriptedLink {
            chunks: VecDeque::from([b"Temp:23.0C,Hum:53.0%,Rail V:5.3V,Light:512\n".to_vec()]),
            broken: false,
        };
        controller.attach(Connection::from_link("/dev/fake0", labeled));
        controller.tick();

        let history = &controller.state().history;
        assert_eq!(history.snapshot(Channel::Temperature).ticks, vec![0, 1, 2, 3]);
        assert_eq!(history.snapshot(Channel::Light).ticks, vec![3]);
        assert_eq!(history.snapshot(Channel::Light).values, vec![512.0]);
        assert_eq!(history.last_tick(), Some(3));
    }

    #[test]
    fn shutdown_notifies_views() {
        let (controller, log) = controller_with(&[]);
        controller.shutdown();
        assert_eq!(log.lock().unwrap().last(), Some(&"shutdown"));
    }
}
