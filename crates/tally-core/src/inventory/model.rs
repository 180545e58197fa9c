//! Inventory domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbology label used when the engine does not report one.
pub const DEFAULT_FORMAT: &str = "CODE_128";

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

/// Identifier of a scan record.
///
/// Derived from the creation time in milliseconds and kept strictly increasing
/// within a process, so it doubles as a chronological sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Largest id a millisecond timestamp can produce. Stored ids above it are
    /// replaced on load.
    pub const MAX: RecordId = RecordId(i64::MAX as u64);
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

/// One observed barcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    /// Unique key, used for deletion.
    pub id: RecordId,
    /// Decoded payload. Never empty.
    pub code: String,
    /// Symbology label (e.g. `CODE_128`, `EAN_13`).
    #[serde(default = "default_format")]
    pub format: String,
    /// Capture time.
    #[serde(rename = "timestamp")]
    pub observed_at: DateTime<Utc>,
}

impl ScanRecord {
    /// Creates a record, falling back to [`DEFAULT_FORMAT`] when no format is given.
    pub fn new(
        id: RecordId,
        code: impl Into<String>,
        format: Option<&str>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        let format = format
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .unwrap_or_else(default_format);

        Self {
            id,
            code: code.into(),
            format,
            observed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_format_defaults_to_code_128() {
        let record = ScanRecord::new(RecordId(1), "123", None, Utc::now());
        assert_eq!(record.format, DEFAULT_FORMAT);

        let blank = ScanRecord::new(RecordId(2), "123", Some("  "), Utc::now());
        assert_eq!(blank.format, DEFAULT_FORMAT);
    }

    #[test]
    fn test_legacy_layout_deserializes() {
        // Entries written before the format field existed.
        let json = r#"{"id":1718000000000,"code":"ABC-1","timestamp":"2024-06-10T06:13:20.000Z"}"#;
        let record: ScanRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, RecordId(1_718_000_000_000));
        assert_eq!(record.code, "ABC-1");
        assert_eq!(record.format, DEFAULT_FORMAT);
    }

    #[test]
    fn test_serializes_observed_at_as_timestamp() {
        let record = ScanRecord::new(RecordId(7), "X", Some("EAN_13"), Utc::now());
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("timestamp").is_some());
        assert!(value.get("observedAt").is_none());
        assert_eq!(value["id"], 7);
        assert_eq!(value["format"], "EAN_13");
    }

    #[test]
    fn test_record_id_parse() {
        assert_eq!(" 42 ".parse::<RecordId>().unwrap(), RecordId(42));
        assert!("abc".parse::<RecordId>().is_err());
    }
}
