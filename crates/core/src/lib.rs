pub mod error;
pub mod event;
pub mod history;
pub mod sample;
pub mod state;
pub mod view;

pub use error::{Result, TelemetryError};
pub use event::Message;
pub use history::{History, HistoryBuffer, HistorySnapshot};
pub use sample::{Channel, Sample};
pub use state::{AppState, LinkStatus};
pub use view::StateView;
