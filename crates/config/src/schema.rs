use serde::{Deserialize, Serialize};
use telemetry_core::history::DEFAULT_CAPACITY;
use telemetry_protocol::{FieldSpec, LineFormat, Preset};

/// Shortest accepted poll interval.
pub const MIN_INTERVAL_MS: u64 = 100;
/// Longest accepted poll interval.
pub const MAX_INTERVAL_MS: u64 = 60_000;

/// Root configuration structure parsed from `telemetry.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Port selection and line settings.
    pub serial: SerialConfig,
    /// Poll timer.
    pub poll: PollConfig,
    /// Plot history.
    pub history: HistoryConfig,
    /// Firmware line format.
    pub format: FormatConfig,
    /// How decoded samples are printed.
    pub output: OutputConfig,
}

/// Serial port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Explicit device path; skips discovery when set.
    pub port: Option<String>,
    /// Line speed in baud.
    pub baud_rate: u32,
    /// Read timeout for a single line read (milliseconds).
    pub read_timeout_ms: u64,
    /// Substrings matched against the port's USB product/manufacturer.
    pub description_markers: Vec<String>,
    /// Substrings matched against the device path.
    pub path_markers: Vec<String>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port:                None,
            baud_rate:           9600,
            read_timeout_ms:     1000,
            description_markers: vec!["Arduino".to_string()],
            path_markers:        vec!["usbmodem".to_string(), "ttyACM".to_string()],
        }
    }
}

/// Poll timer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Time between two polls of the serial port (milliseconds).
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

/// History buffer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Points kept per channel.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Line format selection.
///
/// ```toml
/// [format]
/// preset = "custom"
/// delimiter = ","
/// separator = ":"
///
/// [[format.fields]]
/// label = "Temp"
/// unit = "C"
/// channel = "temperature"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub preset: Preset,
    /// Only used with `preset = "custom"`.
    pub delimiter: String,
    /// Only used with `preset = "custom"`.
    pub separator: String,
    /// Only used with `preset = "custom"`.
    pub fields: Vec<FieldSpec>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            preset:    Preset::Labeled,
            delimiter: ",".to_string(),
            separator: ":".to_string(),
            fields:    Vec::new(),
        }
    }
}

impl FormatConfig {
    /// The line format this section selects.
    pub fn line_format(&self) -> LineFormat {
        LineFormat::from_preset(self.preset).unwrap_or_else(|| LineFormat {
            delimiter: self.delimiter.clone(),
            separator: self.separator.clone(),
            fields:    self.fields.clone(),
        })
    }
}

/// Console output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
}

/// How each update is written to stdout.
///
/// Also accepted as `--output labels|json` on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// One human-readable status line of labels.
    #[default]
    Labels,
    /// One JSON object per decoded sample.
    Json,
}
