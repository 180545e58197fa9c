//! Outbound signals to the UI layer.

use std::time::Duration;

use tally_core::inventory::ScanRecord;
use tally_core::session::{SessionState, Severity, UiEvent};
use tokio::sync::mpsc;

/// Sends [`UiEvent`]s to whoever renders them.
///
/// Sending never fails from the caller's point of view: if the UI went away the
/// event is dropped.
#[derive(Debug, Clone)]
pub struct UiEvents {
    sender: Option<mpsc::UnboundedSender<UiEvent>>,
}

impl UiEvents {
    /// Creates an emitter and the receiving end for the UI.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// An emitter with no UI attached.
    pub fn detached() -> Self {
        Self { sender: None }
    }

    pub fn emit(&self, event: UiEvent) {
        if let Some(sender) = &self.sender {
            // Non-blocking send - if the receiver is dropped, we just skip
            let _ = sender.send(event);
        }
    }

    pub fn inventory_changed(&self, records: Vec<ScanRecord>) {
        self.emit(UiEvent::InventoryChanged { records });
    }

    pub fn notify(&self, message: impl Into<String>, severity: Severity, dismiss_after: Duration) {
        self.emit(UiEvent::Notification {
            message: message.into(),
            severity,
            dismiss_after,
        });
    }

    pub fn session_state(&self, state: SessionState) {
        self.emit(UiEvent::SessionStateChanged { state });
    }

    pub fn preview_visible(&self, visible: bool) {
        self.emit(UiEvent::PreviewVisibility { visible });
    }

    pub fn haptic(&self, duration: Duration) {
        self.emit(UiEvent::Haptic { duration });
    }
}
