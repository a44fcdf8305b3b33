//! telemetry — console monitor for a serial-connected sensor board.
//!
//! Run with:  `RUST_LOG=info telemetry`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use telemetry_config::{OutputMode, TelemetryConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "telemetry")]
#[command(about = "Decode and display sensor telemetry from a serial-connected board")]
#[command(version)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/telemetry/telemetry.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial device to open instead of discovering one
    #[arg(long)]
    port: Option<String>,

    /// Line speed in baud
    #[arg(long)]
    baud: Option<u32>,

    /// Poll interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Output mode: labels (status line) or json (one object per sample)
    #[arg(long, value_enum)]
    output: Option<OutputMode>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List serial ports and mark the one discovery would pick
    ListPorts,
}

impl Cli {
    fn apply_overrides(&self, config: &mut TelemetryConfig) {
        if let Some(port) = &self.port {
            config.serial.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        if let Some(interval) = self.interval_ms {
            config.poll.interval_ms = interval;
        }
        if let Some(mode) = self.output {
            config.output.mode = mode;
        }
    }
}

fn list_ports(config: &TelemetryConfig) -> Result<()> {
    let matcher = telemetry_dashboard::link_settings(&config.serial).matcher;
    let ports = telemetry_serial::list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(());
    }

    let picked = telemetry_serial::find_port(&ports, &matcher).map(|p| p.path.clone());
    for port in &ports {
        let mark = if picked.as_deref() == Some(port.path.as_str()) { "*" } else { " " };
        println!(
            "{mark} {:<28} {}",
            port.path,
            port.description.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the rendered labels / JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(telemetry_config::default_path);

    let mut config = telemetry_config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    cli.apply_overrides(&mut config);
    telemetry_config::validate(&config).context("Invalid command-line override")?;

    match cli.command {
        Some(Commands::ListPorts) => list_ports(&config),
        None => {
            tracing::info!("telemetry v{} starting", env!("CARGO_PKG_VERSION"));
            telemetry_dashboard::run(config, config_path)
                .await
                .map_err(Into::into)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_values() {
        let cli = Cli::parse_from([
            "telemetry",
            "--port",
            "/dev/ttyUSB0",
            "--baud",
            "115200",
            "--interval-ms",
            "250",
            "--output",
            "json",
        ]);
        let mut config = TelemetryConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.serial.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.poll.interval_ms, 250);
        assert_eq!(config.output.mode, OutputMode::Json);
    }

    #[test]
    fn absent_flags_leave_config_alone() {
        let cli = Cli::parse_from(["telemetry"]);
        let mut config = TelemetryConfig::default();
        config.serial.baud_rate = 57_600;
        config.output.mode = OutputMode::Json;
        cli.apply_overrides(&mut config);

        assert_eq!(config.serial.port, None);
        assert_eq!(config.serial.baud_rate, 57_600);
        assert_eq!(config.output.mode, OutputMode::Json);
    }

    #[test]
    fn unknown_output_mode_is_refused() {
        assert!(Cli::try_parse_from(["telemetry", "--output", "csv"]).is_err());
        assert!(matches!(
            Cli::try_parse_from(["telemetry", "list-ports"]).map(|c| c.command),
            Ok(Some(Commands::ListPorts))
        ));
    }
}
