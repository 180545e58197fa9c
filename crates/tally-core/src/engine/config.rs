//! Configuration handed to a scan engine at construction.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::Symbology;

/// Handle of the UI surface the engine renders its preview into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget(pub String);

impl RenderTarget {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A read the engine considers unique within its de-duplication window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedCode {
    pub text: String,
    /// Symbology label, when the engine knows it.
    pub format: Option<String>,
}

impl ScannedCode {
    pub fn new(text: impl Into<String>, format: Option<Symbology>) -> Self {
        Self {
            text: text.into(),
            format: format.map(|f| f.to_string()),
        }
    }
}

pub type BarcodeCallback = Arc<dyn Fn(ScannedCode) + Send + Sync>;
pub type SignalCallback = Arc<dyn Fn() + Send + Sync>;

/// Callbacks an engine invokes while a session runs.
#[derive(Clone)]
pub struct EngineCallbacks {
    /// Invoked once per unique read, in the order reads happen.
    pub on_unique_barcode: BarcodeCallback,
    /// Engine components are initialised.
    pub on_ready: SignalCallback,
    /// The capture device is open and frames are flowing.
    pub on_device_opened: SignalCallback,
}

impl EngineCallbacks {
    /// Callbacks that ignore everything.
    pub fn noop() -> Self {
        Self {
            on_unique_barcode: Arc::new(|_| {}),
            on_ready: Arc::new(|| {}),
            on_device_opened: Arc::new(|| {}),
        }
    }

    pub fn unique_barcode(&self, code: ScannedCode) {
        (self.on_unique_barcode)(code)
    }

    pub fn ready(&self) {
        (self.on_ready)()
    }

    pub fn device_opened(&self) {
        (self.on_device_opened)()
    }
}

impl fmt::Debug for EngineCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineCallbacks").finish_non_exhaustive()
    }
}

/// Fixed configuration for one engine instance.
#[derive(Clone)]
pub struct EngineConfig {
    /// Licence or API credential required by the engine vendor.
    pub authorization_credential: String,
    /// Keep scanning after each read, reporting only unique codes.
    pub continuous_unique_scan_mode: bool,
    pub target_formats: BTreeSet<Symbology>,
    pub render_target: RenderTarget,
    /// Repeat reads of one payload inside this window are not reported.
    pub deduplication_window: Duration,
    /// Show the engine's own close affordance.
    pub show_close_button: bool,
    pub callbacks: EngineCallbacks,
}

impl EngineConfig {
    /// Whether reads of `format` should be reported.
    pub fn accepts(&self, format: Symbology) -> bool {
        self.target_formats.contains(&format)
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let credential = if self.authorization_credential.is_empty() {
            "<empty>"
        } else {
            "<redacted>"
        };
        f.debug_struct("EngineConfig")
            .field("authorization_credential", &credential)
            .field("continuous_unique_scan_mode", &self.continuous_unique_scan_mode)
            .field("target_formats", &self.target_formats)
            .field("render_target", &self.render_target)
            .field("deduplication_window", &self.deduplication_window)
            .field("show_close_button", &self.show_close_button)
            .finish_non_exhaustive()
    }
}
