use serde::{Deserialize, Serialize};
use strum::Display;

/// Lifecycle of a scan session.
///
/// `Idle` is both the initial and the terminal state; a process may cycle through
/// many sessions. Failures are not a resting state: they force cleanup back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Starting,
    Active,
    Stopping,
}

impl SessionState {
    /// Whether an engine instance may be alive in this state.
    pub fn is_running(self) -> bool {
        !matches!(self, SessionState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
        assert!(!SessionState::Idle.is_running());
    }

    #[test]
    fn test_display_matches_serde_names() {
        assert!(SessionState::Stopping.is_running());
        assert_eq!(SessionState::Active.to_string(), "active");
        assert_eq!(
            serde_json::to_string(&SessionState::Starting).unwrap(),
            "\"starting\""
        );
    }
}
