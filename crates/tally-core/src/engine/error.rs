use thiserror::Error;

/// Failures reported by a scan engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine could not be constructed (bad configuration, missing device).
    #[error("Engine initialisation failed: {0}")]
    Init(String),

    /// `launch()` rejected: permission denied, device busy, unsupported platform.
    #[error("{0}")]
    Launch(String),

    /// The user declined access or dismissed the engine's own UI.
    #[error("Cancelled by user: {0}")]
    UserCancelled(String),

    /// `dispose()` failed to release something.
    #[error("Engine teardown failed: {0}")]
    Teardown(String),
}

impl EngineError {
    /// Classifies a free-text rejection message coming out of an engine.
    ///
    /// Engines that only report a message (no structured reason) signal user
    /// cancellation through wording such as "cancelled", "aborted" or "dismissed".
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("cancel") || lower.contains("abort") || lower.contains("dismiss") {
            Self::UserCancelled(message)
        } else {
            Self::Launch(message)
        }
    }

    /// Check if this error means the user backed out rather than something failing
    pub fn is_user_cancelled(&self) -> bool {
        matches!(self, Self::UserCancelled(_))
    }

    /// The human-readable message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Init(m) | Self::Launch(m) | Self::UserCancelled(m) | Self::Teardown(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_message_detects_cancellation() {
        assert!(EngineError::from_message("Permission prompt was dismissed").is_user_cancelled());
        assert!(EngineError::from_message("AbortError: user aborted").is_user_cancelled());
        assert!(EngineError::from_message("Operation Cancelled").is_user_cancelled());
    }

    #[test]
    fn test_from_message_defaults_to_launch() {
        let err = EngineError::from_message("NotReadableError: camera in use");
        assert_eq!(err, EngineError::Launch("NotReadableError: camera in use".into()));
        assert_eq!(err.message(), "NotReadableError: camera in use");
    }
}
