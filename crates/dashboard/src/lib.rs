//! Telemetry dashboard — the console front end.
//!
//! Wires together:
//! - serial discovery and the connection (opened once at startup)
//! - the poll timer (one poll → decode → render cycle per tick)
//! - the config watcher (live line-format reload)
//! - Ctrl+C (graceful shutdown)

pub mod controller;
pub mod render;

pub use controller::Controller;
pub use render::{JsonView, LabelView};

use std::path::PathBuf;
use std::time::Duration;
use telemetry_config::{ConfigWatcher, OutputMode, SerialConfig, TelemetryConfig};
use telemetry_core::{event::Message, LinkStatus, Result, StateView};
use telemetry_serial::{LinkSettings, PortMatcher};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Translate the `[serial]` config section into connection settings.
pub fn link_settings(serial: &SerialConfig) -> LinkSettings {
    LinkSettings {
        port:         serial.port.clone(),
        baud_rate:    serial.baud_rate,
        read_timeout: Duration::from_millis(serial.read_timeout_ms),
        matcher:      PortMatcher {
            description_markers: serial.description_markers.clone(),
            path_markers:        serial.path_markers.clone(),
        },
    }
}

fn views_for(mode: OutputMode) -> Vec<Box<dyn StateView>> {
    match mode {
        OutputMode::Labels => vec![Box::new(LabelView::stdout())],
        OutputMode::Json   => vec![Box::new(JsonView::stdout())],
    }
}

/// Run the monitor until Ctrl+C.
///
/// A missing or unopenable port is not fatal: the dashboard keeps running
/// with `N/A` labels and does not retry.
pub async fn run(config: TelemetryConfig, config_path: PathBuf) -> Result<()> {
    let format = config.format.line_format();
    info!(layout = %format.template(), "Expecting telemetry lines");

    let mut controller = Controller::new(config.history.capacity, format, views_for(config.output.mode));

    match telemetry_serial::establish(&link_settings(&config.serial)) {
        Ok(connection) => controller.attach(connection),
        Err(e) => {
            warn!("Telemetry device unavailable: {e}");
            controller.handle(Message::LinkChanged(LinkStatus::Disconnected));
        }
    }

    let (watcher, mut reloads) = ConfigWatcher::spawn(&config_path);
    debug!(config = %watcher.path().display(), "Live format reload armed");

    let mut ticker = time::interval(Duration::from_millis(config.poll.interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(interval_ms = config.poll.interval_ms, "Monitor running. Press Ctrl+C to stop.");
    loop {
        tokio::select! {
            _ = ticker.tick() => controller.tick(),
            Some(new_config) = reloads.recv() => {
                info!("Config reloaded");
                controller.reload(&new_config);
            }
            _ = &mut shutdown => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    let state = controller.state();
    info!(
        decoded = state.samples_decoded,
        rejected = state.lines_rejected,
        "Monitor stopped"
    );
    controller.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_settings_carry_serial_section() {
        let serial = SerialConfig {
            port: Some("/dev/ttyUSB1".into()),
            baud_rate: 115_200,
            read_timeout_ms: 250,
            ..SerialConfig::default()
        };
        let settings = link_settings(&serial);

        assert_eq!(settings.port.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!(settings.read_timeout, Duration::from_millis(250));
        assert_eq!(settings.matcher.description_markers, vec!["Arduino".to_string()]);
    }

    #[test]
    fn each_output_mode_has_one_view() {
        assert_eq!(views_for(OutputMode::Labels)[0].id(), "labels");
        assert_eq!(views_for(OutputMode::Json)[0].id(), "json");
    }
}
