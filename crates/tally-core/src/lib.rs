//! Domain types and seams for tally: scan records, session lifecycle, the scan engine
//! capability and durable storage.

pub mod config;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod session;
pub mod storage;

// Re-export common error type
pub use error::{Result, TallyError};
