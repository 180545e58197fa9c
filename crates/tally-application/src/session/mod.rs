//! Scan session lifecycle.

mod controller;

pub use controller::{SessionController, SessionSettings, StartOutcome};
