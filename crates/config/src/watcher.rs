use crate::{load, TelemetryConfig};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Watches the config file and delivers a freshly loaded, validated
/// [`TelemetryConfig`] after every change.
///
/// The parent directory is watched rather than the file itself, so editors
/// that save by rename and a file created after startup are both picked up.
/// A change that fails to load is logged and skipped.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// use telemetry_config::ConfigWatcher;
///
/// let (_watcher, mut rx) = ConfigWatcher::spawn("/home/user/.config/telemetry/telemetry.toml");
/// while let Some(config) = rx.recv().await {
///     println!("new line format: {}", config.format.line_format().template());
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path`.
    /// Returns the watcher handle and a receiver of reloaded configs.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<TelemetryConfig>) {
        let (tx, rx) = mpsc::channel(1);
        let path = path.as_ref().to_path_buf();
        let watcher = Self { path: path.clone() };

        tokio::spawn(watch_loop(path, tx));

        (watcher, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<TelemetryConfig>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.is_dir() {
        warn!("Config directory for '{}' does not exist; live reload disabled", path.display());
        return;
    }

    let (sync_tx, mut sync_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = sync_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
        error!("Failed to watch '{}': {e}", dir.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    while let Some(event) = sync_rx.recv().await {
        match event {
            Ok(e) => {
                use notify::EventKind::*;
                let ours = e.paths.iter().any(|p| p.file_name() == path.file_name());
                if !ours || !matches!(e.kind, Modify(_) | Create(_)) {
                    continue;
                }
                match load(&path) {
                    Ok(config) => {
                        if tx.send(config).await.is_err() {
                            break; // receiver dropped
                        }
                    }
                    Err(e) => warn!("Ignoring config change: {e}"),
                }
            }
            Err(e) => warn!("Watcher error: {e}"),
        }
    }
}
