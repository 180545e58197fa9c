//! Scan engine fed by a stream of text lines.
//!
//! Keyboard-wedge and serial barcode scanners deliver each read as a line of text,
//! optionally prefixed with an AIM symbology identifier (`]C0`, `]E0`, ...). This
//! engine turns such a stream into unique-barcode callbacks.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use tally_core::engine::{
    DuplicateFilter, EngineConfig, EngineError, EngineFactory, ScanEngine, ScannedCode, Symbology,
};

/// Line that ends the session when the close affordance is enabled.
pub const CLOSE_COMMAND: &str = ":q";

pub type LineSource = Box<dyn AsyncBufRead + Send + Unpin>;

type SourceOpener = Arc<dyn Fn() -> LineSource + Send + Sync>;

/// Creates a [`LineEngine`] per session, each with a freshly opened source.
#[derive(Clone)]
pub struct LineEngineFactory {
    open: SourceOpener,
}

impl LineEngineFactory {
    pub fn new<F>(open: F) -> Self
    where
        F: Fn() -> LineSource + Send + Sync + 'static,
    {
        Self {
            open: Arc::new(open),
        }
    }

    /// Reads scanner input from the process's standard input.
    pub fn stdin() -> Self {
        Self::new(|| Box::new(BufReader::new(tokio::io::stdin())))
    }
}

impl EngineFactory for LineEngineFactory {
    fn create(&self, config: EngineConfig) -> Result<Arc<dyn ScanEngine>, EngineError> {
        if config.target_formats.is_empty() {
            return Err(EngineError::Init(
                "No target barcode formats configured".to_string(),
            ));
        }

        tracing::debug!(?config, "Creating line engine");
        Ok(Arc::new(LineEngine::new(config, (self.open)())))
    }
}

enum Flow {
    Continue,
    Close,
}

/// Engine reading one barcode per line.
pub struct LineEngine {
    config: EngineConfig,
    source: Mutex<Option<LineSource>>,
    filter: Mutex<DuplicateFilter>,
    cancel: CancellationToken,
}

impl LineEngine {
    pub fn new(config: EngineConfig, source: LineSource) -> Self {
        let filter = DuplicateFilter::new(config.deduplication_window);
        Self {
            config,
            source: Mutex::new(Some(source)),
            filter: Mutex::new(filter),
            cancel: CancellationToken::new(),
        }
    }

    fn handle_line(&self, line: &str) -> Flow {
        let raw = line.trim();
        if raw.is_empty() {
            return Flow::Continue;
        }
        if self.config.show_close_button && raw == CLOSE_COMMAND {
            tracing::debug!("Close requested from scanner input");
            return Flow::Close;
        }

        let (format, payload) = match Symbology::split_aim_prefix(raw) {
            Some((format, payload)) => (Some(format), payload.trim()),
            None => (None, raw),
        };
        if payload.is_empty() {
            return Flow::Continue;
        }
        // Unprefixed reads are recorded under the default symbology.
        let effective = format.unwrap_or_default();
        if !self.config.accepts(effective) {
            tracing::debug!(format = %effective, "Ignoring read of untargeted symbology");
            return Flow::Continue;
        }

        let unique = self
            .filter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(payload);
        if !unique {
            tracing::trace!(code = payload, "Suppressed duplicate read");
            return Flow::Continue;
        }

        self.config
            .callbacks
            .unique_barcode(ScannedCode::new(payload, format));

        if self.config.continuous_unique_scan_mode {
            Flow::Continue
        } else {
            Flow::Close
        }
    }
}

#[async_trait]
impl ScanEngine for LineEngine {
    async fn launch(&self) -> Result<(), EngineError> {
        if self.cancel.is_cancelled() {
            return Err(EngineError::Launch("Engine has been disposed".to_string()));
        }
        let source = self
            .source
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| EngineError::Launch("Engine was already launched".to_string()))?;

        self.config.callbacks.ready();
        self.config.callbacks.device_opened();

        let mut lines = source.lines();
        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    tracing::debug!("Line engine disposed while scanning");
                    return Ok(());
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if let Flow::Close = self.handle_line(&line) {
                            return Ok(());
                        }
                    }
                    Ok(None) => {
                        tracing::debug!("Scanner input closed");
                        return Ok(());
                    }
                    Err(e) => {
                        return Err(EngineError::Launch(format!(
                            "Failed to read scanner input: {}",
                            e
                        )));
                    }
                },
            }
        }
    }

    async fn dispose(&self) -> Result<(), EngineError> {
        self.cancel.cancel();
        self.source
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.filter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}
