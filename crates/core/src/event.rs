use crate::sample::Sample;
use crate::state::LinkStatus;

/// All messages (events) that flow through the controller.
///
/// Sources:
/// - Serial poll on each tick   → `SampleDecoded`, `LineRejected`
/// - Connection setup           → `LinkChanged`
/// - Config watcher task        → `ConfigReloaded`
/// - Timer                      → `Tick`
#[derive(Debug, Clone)]
pub enum Message {
    // ── Serial ────────────────────────────────────────────────────────────────
    /// A line decoded cleanly into a sample.
    SampleDecoded(Sample),
    /// A line did not match the active format and was dropped.
    LineRejected { line: String, reason: String },
    /// The serial link was opened or lost.
    LinkChanged(LinkStatus),

    // ── Config ────────────────────────────────────────────────────────────────
    /// Config file changed on disk — triggers a live reload.
    ConfigReloaded,

    // ── Internal ──────────────────────────────────────────────────────────────
    /// Poll timer fired.
    Tick,
    /// Graceful shutdown requested.
    Shutdown,
}
