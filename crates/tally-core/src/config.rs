//! Application configuration model (`config.toml`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::Symbology;

/// Storage key the inventory is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "barcode_inventory";

/// Root of `config.toml`. Every section and field is optional in the file.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct TallyConfig {
    pub scanner: ScannerSettings,
    pub feedback: FeedbackSettings,
    pub storage: StorageSettings,
    pub export: ExportSettings,
    pub logging: LoggingSettings,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ScannerSettings {
    pub authorization_credential: String,
    pub continuous_unique_scan_mode: bool,
    pub target_formats: BTreeSet<Symbology>,
    pub render_target: String,
    pub deduplication_window_ms: u64,
    /// Show the engine's own close affordance.
    pub show_close_button: bool,
    /// Treat the engine ending its session on its own as a stop request.
    pub stop_on_engine_close: bool,
    /// Ignore start requests for this long after the engine closed itself.
    pub relaunch_cooldown_ms: u64,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            authorization_credential: String::new(),
            continuous_unique_scan_mode: true,
            target_formats: BTreeSet::from([Symbology::Code128]),
            render_target: "scanner-container".to_string(),
            deduplication_window_ms: 2000,
            show_close_button: false,
            stop_on_engine_close: true,
            relaunch_cooldown_ms: 0,
        }
    }
}

impl ScannerSettings {
    pub fn deduplication_window(&self) -> Duration {
        Duration::from_millis(self.deduplication_window_ms)
    }

    pub fn relaunch_cooldown(&self) -> Duration {
        Duration::from_millis(self.relaunch_cooldown_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FeedbackSettings {
    pub notification_ms: u64,
    /// Haptic pulse length; 0 disables it.
    pub haptic_ms: u64,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            notification_ms: 2000,
            haptic_ms: 100,
        }
    }
}

impl FeedbackSettings {
    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn haptic_duration(&self) -> Option<Duration> {
        (self.haptic_ms > 0).then(|| Duration::from_millis(self.haptic_ms))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    pub key: String,
    /// Overrides the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            dir: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExportSettings {
    pub delimiter: char,
    pub filename_prefix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            delimiter: ';',
            filename_prefix: "scan".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Also write daily-rolling log files.
    pub file: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config: TallyConfig = toml::from_str("").unwrap();
        assert_eq!(config, TallyConfig::default());
        assert_eq!(config.storage.key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.scanner.deduplication_window(), Duration::from_millis(2000));
        assert!(config.scanner.stop_on_engine_close);
    }

    #[test]
    fn test_partial_sections() {
        let config: TallyConfig = toml::from_str(
            r#"
            [scanner]
            target_formats = ["CODE_128", "EAN_13"]
            stop_on_engine_close = false

            [feedback]
            haptic_ms = 0

            [export]
            delimiter = ","
            "#,
        )
        .unwrap();

        assert!(config.scanner.target_formats.contains(&Symbology::Ean13));
        assert!(!config.scanner.stop_on_engine_close);
        assert_eq!(config.scanner.render_target, "scanner-container");
        assert_eq!(config.feedback.haptic_duration(), None);
        assert_eq!(config.feedback.notification_ms, 2000);
        assert_eq!(config.export.delimiter, ',');
        assert_eq!(config.export.filename_prefix, "scan");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = TallyConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: TallyConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
