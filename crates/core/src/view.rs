use crate::{event::Message, state::AppState};

/// Anything that presents [`AppState`] to the user.
///
/// Views are purely reactive: they receive a read-only view of `AppState`
/// after each update and never mutate it.
pub trait StateView: std::fmt::Debug {
    /// Unique string identifier, e.g. `"labels"` or `"json"`.
    fn id(&self) -> &str;

    /// Called after the controller has handled `message`.
    fn on_message(&mut self, message: &Message, state: &AppState);
}
