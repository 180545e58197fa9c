use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::Instrument;
use uuid::Uuid;

use tally_core::config::TallyConfig;
use tally_core::engine::{
    EngineCallbacks, EngineConfig, EngineError, EngineFactory, RenderTarget, ScanEngine,
    ScannedCode, Symbology,
};
use tally_core::session::{SessionState, Severity};

use crate::inventory::InventoryStore;
use crate::ui::UiEvents;

/// Everything the controller needs to know to build engines and give feedback.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub authorization_credential: String,
    pub continuous_unique_scan_mode: bool,
    pub target_formats: BTreeSet<Symbology>,
    pub render_target: RenderTarget,
    pub deduplication_window: Duration,
    pub show_close_button: bool,
    /// The engine ending its session on its own counts as a stop.
    ///
    /// When unset, a resolved launch leaves the session `Active` until `stop()`.
    pub stop_on_engine_close: bool,
    /// Start requests this soon after an engine-driven close are ignored.
    pub relaunch_cooldown: Duration,
    pub notification_duration: Duration,
    pub haptic: Option<Duration>,
}

impl SessionSettings {
    pub fn from_config(config: &TallyConfig) -> Self {
        let scanner = &config.scanner;
        Self {
            authorization_credential: scanner.authorization_credential.clone(),
            continuous_unique_scan_mode: scanner.continuous_unique_scan_mode,
            target_formats: scanner.target_formats.clone(),
            render_target: RenderTarget::new(scanner.render_target.clone()),
            deduplication_window: scanner.deduplication_window(),
            show_close_button: scanner.show_close_button,
            stop_on_engine_close: scanner.stop_on_engine_close,
            relaunch_cooldown: scanner.relaunch_cooldown(),
            notification_duration: config.feedback.notification_duration(),
            haptic: config.feedback.haptic_duration(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&TallyConfig::default())
    }
}

/// How a call to [`SessionController::start`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Launch resolved; the session stays `Active` until `stop()`.
    Launched,
    /// The engine closed the session and it was torn down.
    Ended,
    /// A stop (or a newer session) overtook this launch; its result was discarded.
    Stopped,
    /// The user declined or dismissed the engine before it started.
    Cancelled,
    /// The engine could not be built or launched.
    Failed(String),
    /// A session was already running; nothing was done.
    AlreadyRunning,
    /// Refused because the engine closed itself moments ago.
    CoolingDown,
}

struct SessionSlot {
    state: SessionState,
    /// Bumped on every start and every teardown. Callbacks and launch results
    /// carrying an older value are ignored.
    epoch: u64,
    engine: Option<Arc<dyn ScanEngine>>,
    session_id: Option<Uuid>,
    closed_by_engine_at: Option<Instant>,
}

struct ControllerInner {
    factory: Arc<dyn EngineFactory>,
    store: Arc<InventoryStore>,
    events: UiEvents,
    settings: SessionSettings,
    slot: Mutex<SessionSlot>,
}

/// Drives the scan engine through `Idle → Starting → Active → Stopping → Idle`.
///
/// Cloning is cheap; all clones control the same session. At most one engine
/// instance is alive at any time. Every exit path (user stop, cancellation,
/// launch failure, engine-driven close) goes through the same teardown, which
/// never fails.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<ControllerInner>,
}

impl SessionController {
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        store: Arc<InventoryStore>,
        events: UiEvents,
        settings: SessionSettings,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                factory,
                store,
                events,
                settings,
                slot: Mutex::new(SessionSlot {
                    state: SessionState::Idle,
                    epoch: 0,
                    engine: None,
                    session_id: None,
                    closed_by_engine_at: None,
                }),
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.slot().state
    }

    /// Identifier of the running session, used in logs.
    pub fn session_id(&self) -> Option<Uuid> {
        self.inner.slot().session_id
    }

    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.inner.store
    }

    /// Starts a session and waits until its launch settles.
    ///
    /// Only acts from `Idle`. The returned future completes when the engine's
    /// launch resolves or rejects, which for most engines means when the session
    /// is over. Run it on its own task if the caller needs to keep going.
    pub async fn start(&self) -> StartOutcome {
        let (epoch, session_id) = match self.inner.begin() {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        let span = tracing::info_span!("scan_session", %session_id);
        self.inner.run(epoch).instrument(span).await
    }

    /// Stops the running session, if any. Safe to call at any time, any number of
    /// times.
    pub async fn stop(&self) {
        if !self.inner.teardown(None).await {
            tracing::debug!("Stop ignored, no session to stop");
        }
    }

    /// `start()` from `Idle`, `stop()` otherwise.
    ///
    /// Returns the start outcome when a start was issued.
    pub async fn toggle(&self) -> Option<StartOutcome> {
        if !self.state().is_running() {
            Some(self.start().await)
        } else {
            self.stop().await;
            None
        }
    }
}

enum Settled {
    Ignore,
    KeepActive,
    Teardown(Claimed),
}

/// Engine taken out of the slot by a teardown that has not finished yet.
struct Claimed(Option<Arc<dyn ScanEngine>>);

impl ControllerInner {
    fn slot(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, slot: &mut SessionSlot, state: SessionState) {
        if slot.state == state {
            return;
        }
        tracing::debug!(from = %slot.state, to = %state, "Session state change");
        slot.state = state;
        self.events.session_state(state);
    }

    /// Claims the engine slot. Fails without side effects unless `Idle`.
    fn begin(&self) -> Result<(u64, Uuid), StartOutcome> {
        let mut slot = self.slot();
        if slot.state != SessionState::Idle {
            tracing::debug!(state = %slot.state, "Start ignored, session already running");
            return Err(StartOutcome::AlreadyRunning);
        }
        if let Some(closed_at) = slot.closed_by_engine_at {
            if closed_at.elapsed() < self.settings.relaunch_cooldown {
                tracing::debug!("Start ignored, engine closed moments ago");
                return Err(StartOutcome::CoolingDown);
            }
        }

        slot.epoch += 1;
        let session_id = Uuid::new_v4();
        slot.session_id = Some(session_id);
        self.set_state(&mut slot, SessionState::Starting);
        self.events.preview_visible(true);
        Ok((slot.epoch, session_id))
    }

    async fn run(self: &Arc<Self>, epoch: u64) -> StartOutcome {
        let engine = match self.factory.create(self.engine_config(epoch)) {
            Ok(engine) => engine,
            Err(e) => return self.fail(epoch, e).await,
        };

        let superseded = {
            let mut slot = self.slot();
            if slot.epoch == epoch {
                slot.engine = Some(engine.clone());
                false
            } else {
                true
            }
        };
        if superseded {
            // Stopped while the engine was being built; nobody else will dispose it.
            dispose_quietly(engine.as_ref()).await;
            return StartOutcome::Stopped;
        }

        tracing::info!("Launching scan engine");
        match engine.launch().await {
            Ok(()) => self.launch_resolved(epoch).await,
            Err(e) => self.fail(epoch, e).await,
        }
    }

    async fn launch_resolved(&self, epoch: u64) -> StartOutcome {
        let settled = {
            let mut slot = self.slot();
            if slot.epoch != epoch {
                Settled::Ignore
            } else if self.settings.stop_on_engine_close {
                match self.claim_teardown(&mut slot, Some(epoch)) {
                    Some(claimed) => {
                        slot.closed_by_engine_at = Some(Instant::now());
                        Settled::Teardown(claimed)
                    }
                    None => Settled::Ignore,
                }
            } else {
                self.set_state(&mut slot, SessionState::Active);
                Settled::KeepActive
            }
        };

        match settled {
            Settled::Ignore => {
                tracing::debug!("Launch resolved after the session was stopped, ignoring");
                StartOutcome::Stopped
            }
            Settled::KeepActive => StartOutcome::Launched,
            Settled::Teardown(claimed) => {
                tracing::info!("Engine closed the session");
                self.finish_teardown(claimed).await;
                StartOutcome::Ended
            }
        }
    }

    async fn fail(&self, epoch: u64, error: EngineError) -> StartOutcome {
        let claimed = {
            let mut slot = self.slot();
            self.claim_teardown(&mut slot, Some(epoch))
        };
        let Some(claimed) = claimed else {
            tracing::debug!("Launch failed after the session was stopped, ignoring: {}", error);
            return StartOutcome::Stopped;
        };

        let outcome = if error.is_user_cancelled() {
            tracing::info!("Scan session cancelled by user");
            StartOutcome::Cancelled
        } else {
            tracing::error!("Failed to start scan session: {}", error);
            self.events.notify(
                format!("Error: {}", error.message()),
                Severity::Error,
                self.settings.notification_duration,
            );
            StartOutcome::Failed(error.message().to_string())
        };
        self.finish_teardown(claimed).await;
        outcome
    }

    /// The one cleanup routine. Returns `false` when there was nothing to tear
    /// down (already idle, already stopping, or `expected` is stale).
    async fn teardown(&self, expected: Option<u64>) -> bool {
        let claimed = {
            let mut slot = self.slot();
            self.claim_teardown(&mut slot, expected)
        };
        match claimed {
            Some(claimed) => {
                self.finish_teardown(claimed).await;
                true
            }
            None => false,
        }
    }

    /// First half of teardown, run under the slot lock: invalidates the session
    /// and takes its engine. Whoever gets `Some` owns the rest of the cleanup.
    fn claim_teardown(&self, slot: &mut SessionSlot, expected: Option<u64>) -> Option<Claimed> {
        if expected.is_some_and(|epoch| epoch != slot.epoch) {
            return None;
        }
        if !matches!(slot.state, SessionState::Starting | SessionState::Active) {
            return None;
        }
        slot.epoch += 1;
        self.set_state(slot, SessionState::Stopping);
        Some(Claimed(slot.engine.take()))
    }

    async fn finish_teardown(&self, Claimed(engine): Claimed) {
        if let Some(engine) = engine {
            dispose_quietly(engine.as_ref()).await;
        }

        let mut slot = self.slot();
        slot.session_id = None;
        self.set_state(&mut slot, SessionState::Idle);
        self.events.preview_visible(false);
        tracing::info!("Scan session stopped");
    }

    fn engine_config(self: &Arc<Self>, epoch: u64) -> EngineConfig {
        let weak = Arc::downgrade(self);
        let callbacks = EngineCallbacks {
            on_unique_barcode: {
                let weak = weak.clone();
                Arc::new(move |code| {
                    if let Some(inner) = weak.upgrade() {
                        inner.barcode_observed(epoch, code);
                    }
                })
            },
            on_ready: Arc::new(|| tracing::debug!("Scan engine ready")),
            on_device_opened: Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.device_opened(epoch);
                }
            }),
        };

        let settings = &self.settings;
        EngineConfig {
            authorization_credential: settings.authorization_credential.clone(),
            continuous_unique_scan_mode: settings.continuous_unique_scan_mode,
            target_formats: settings.target_formats.clone(),
            render_target: settings.render_target.clone(),
            deduplication_window: settings.deduplication_window,
            show_close_button: settings.show_close_button,
            callbacks,
        }
    }

    fn device_opened(&self, epoch: u64) {
        let mut slot = self.slot();
        if slot.epoch == epoch && slot.state == SessionState::Starting {
            tracing::info!("Capture device opened");
            self.set_state(&mut slot, SessionState::Active);
        }
    }

    fn barcode_observed(&self, epoch: u64, code: ScannedCode) {
        if self.slot().epoch != epoch {
            tracing::debug!(code = %code.text, "Dropped read from a stopped session");
            return;
        }

        match self.store.insert(&code.text, code.format.as_deref()) {
            Ok(record) => {
                self.events
                    .notify(record.code, Severity::Info, self.settings.notification_duration);
                if let Some(duration) = self.settings.haptic {
                    self.events.haptic(duration);
                }
            }
            Err(e) => tracing::warn!("Ignored barcode read: {}", e),
        }
    }
}

async fn dispose_quietly(engine: &dyn ScanEngine) {
    if let Err(e) = engine.dispose().await {
        tracing::warn!("Engine teardown failed: {}", e);
    }
}
