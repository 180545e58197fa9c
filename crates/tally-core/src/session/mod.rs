//! Scan session lifecycle types and the signals sent to the UI layer.

mod event;
mod state;

pub use event::{Severity, UiEvent};
pub use state::SessionState;
