//! Seam between the session controller and an external scan engine.
//!
//! An engine owns the heavyweight resources (capture device, decode workers, the
//! preview it injects into the render target). The controller only ever talks to it
//! through [`EngineFactory`] and [`ScanEngine`].

mod config;
mod dedup;
mod error;
mod symbology;

use async_trait::async_trait;
use std::sync::Arc;

pub use config::{
    BarcodeCallback, EngineCallbacks, EngineConfig, RenderTarget, ScannedCode, SignalCallback,
};
pub use dedup::DuplicateFilter;
pub use error::EngineError;
pub use symbology::Symbology;

/// A running (or runnable) engine instance.
#[async_trait]
pub trait ScanEngine: Send + Sync {
    /// Opens the device and scans until the session ends.
    ///
    /// Resolves when the session is over, either because [`ScanEngine::dispose`] was
    /// called or because the engine closed itself (native close affordance, end of
    /// input). Rejects when the session could not start.
    async fn launch(&self) -> Result<(), EngineError>;

    /// Releases every resource the engine holds.
    ///
    /// Must be safe to call more than once and while `launch` is still pending.
    async fn dispose(&self) -> Result<(), EngineError>;
}

/// Builds engine instances.
pub trait EngineFactory: Send + Sync {
    fn create(&self, config: EngineConfig) -> Result<Arc<dyn ScanEngine>, EngineError>;
}
