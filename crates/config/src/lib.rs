pub mod schema;
pub mod watcher;

pub use schema::{
    FormatConfig, HistoryConfig, OutputConfig, OutputMode, PollConfig, SerialConfig,
    TelemetryConfig,
};
pub use watcher::ConfigWatcher;

use schema::{MAX_INTERVAL_MS, MIN_INTERVAL_MS};
use std::path::{Path, PathBuf};
use telemetry_core::{Result, TelemetryError};

/// Load configuration from a TOML file.  Returns `TelemetryConfig::default()`
/// if the file doesn't exist so the monitor always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<TelemetryConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(TelemetryConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| TelemetryError::Config(format!("cannot read '{}': {e}", path.display())))?;

    let config: TelemetryConfig =
        toml::from_str(&raw).map_err(|e| TelemetryError::Config(format!("TOML parse error: {e}")))?;

    validate(&config)?;
    Ok(config)
}

/// Reject values the monitor cannot run with.
pub fn validate(config: &TelemetryConfig) -> Result<()> {
    if config.history.capacity == 0 {
        return Err(TelemetryError::Config(
            "history.capacity must be greater than 0".into(),
        ));
    }

    let interval = config.poll.interval_ms;
    if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&interval) {
        return Err(TelemetryError::Config(format!(
            "poll.interval_ms must be within {MIN_INTERVAL_MS}..={MAX_INTERVAL_MS}, got {interval}"
        )));
    }

    if config.serial.baud_rate == 0 {
        return Err(TelemetryError::Config("serial.baud_rate must be greater than 0".into()));
    }

    config
        .format
        .line_format()
        .validate()
        .map_err(|e| TelemetryError::Config(format!("format: {e}")))
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("telemetry").join("telemetry.toml")
}
