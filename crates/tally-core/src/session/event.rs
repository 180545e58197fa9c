use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::SessionState;
use crate::inventory::ScanRecord;

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Error,
}

/// Signals the core produces for the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Full collection, newest first, for re-rendering.
    InventoryChanged { records: Vec<ScanRecord> },
    /// Transient message, auto-dismissed after `dismiss_after`.
    Notification {
        message: String,
        severity: Severity,
        #[serde(with = "millis")]
        dismiss_after: Duration,
    },
    /// Session lifecycle change, for the toggle control.
    SessionStateChanged { state: SessionState },
    /// Show or hide the preview surface the engine renders into.
    PreviewVisibility { visible: bool },
    /// Short vibration acknowledging a read.
    Haptic {
        #[serde(with = "millis")]
        duration: Duration,
    },
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_serializes_millis() {
        let event = UiEvent::Notification {
            message: "111".into(),
            severity: Severity::Info,
            dismiss_after: Duration::from_millis(2000),
        };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "notification");
        assert_eq!(value["severity"], "info");
        assert_eq!(value["dismiss_after"], 2000);
    }

    #[test]
    fn test_state_change_serializes_state() {
        let event = UiEvent::SessionStateChanged {
            state: SessionState::Starting,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "session_state_changed");
        assert_eq!(value["state"], "starting");
    }
}
