//! Scan engine implementations.

mod line_engine;

pub use line_engine::{CLOSE_COMMAND, LineEngine, LineEngineFactory, LineSource};
