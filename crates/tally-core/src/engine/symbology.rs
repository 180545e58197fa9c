//! Barcode symbologies and AIM symbology identifiers.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Barcode symbologies an engine can be asked to recognise.
///
/// The string form (`CODE_128`, `EAN_13`, ...) is what ends up in
/// [`crate::inventory::ScanRecord::format`] and in configuration files.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum Symbology {
    #[serde(rename = "CODE_128")]
    #[strum(serialize = "CODE_128")]
    Code128,
    #[serde(rename = "CODE_39")]
    #[strum(serialize = "CODE_39")]
    Code39,
    #[serde(rename = "CODE_93")]
    #[strum(serialize = "CODE_93")]
    Code93,
    #[serde(rename = "CODABAR")]
    #[strum(serialize = "CODABAR")]
    Codabar,
    #[serde(rename = "ITF")]
    #[strum(serialize = "ITF")]
    Itf,
    #[serde(rename = "EAN_13")]
    #[strum(serialize = "EAN_13")]
    Ean13,
    #[serde(rename = "EAN_8")]
    #[strum(serialize = "EAN_8")]
    Ean8,
    #[serde(rename = "UPC_A")]
    #[strum(serialize = "UPC_A")]
    UpcA,
    #[serde(rename = "UPC_E")]
    #[strum(serialize = "UPC_E")]
    UpcE,
    #[serde(rename = "QR_CODE")]
    #[strum(serialize = "QR_CODE")]
    QrCode,
    #[serde(rename = "DATAMATRIX")]
    #[strum(serialize = "DATAMATRIX")]
    DataMatrix,
    #[serde(rename = "PDF417")]
    #[strum(serialize = "PDF417")]
    Pdf417,
    #[serde(rename = "AZTEC")]
    #[strum(serialize = "AZTEC")]
    Aztec,
}

impl Default for Symbology {
    fn default() -> Self {
        Symbology::Code128
    }
}

impl Symbology {
    /// Splits an AIM symbology identifier (`]` + code character + modifier) off the
    /// front of a raw scanner line.
    ///
    /// Returns `None` when the line carries no recognisable identifier, in which case
    /// the whole line is the payload.
    ///
    /// ```
    /// use tally_core::engine::Symbology;
    ///
    /// let (format, payload) = Symbology::split_aim_prefix("]E05901234123457").unwrap();
    /// assert_eq!(format, Symbology::Ean13);
    /// assert_eq!(payload, "5901234123457");
    /// ```
    pub fn split_aim_prefix(raw: &str) -> Option<(Symbology, &str)> {
        let mut chars = raw.chars();
        if chars.next()? != ']' {
            return None;
        }
        let code = chars.next()?;
        let modifier = chars.next()?;
        if !modifier.is_ascii_alphanumeric() {
            return None;
        }

        let symbology = match (code, modifier) {
            ('C', _) => Symbology::Code128,
            ('A', _) => Symbology::Code39,
            ('G', _) => Symbology::Code93,
            ('F', _) => Symbology::Codabar,
            ('I', _) => Symbology::Itf,
            ('E', '4') => Symbology::Ean8,
            ('E', _) => Symbology::Ean13,
            ('Q', _) => Symbology::QrCode,
            ('d', _) => Symbology::DataMatrix,
            ('L', _) => Symbology::Pdf417,
            ('z', _) => Symbology::Aztec,
            _ => return None,
        };

        Some((symbology, &raw[3..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_string_forms_match_serde() {
        for (symbology, label) in [
            (Symbology::Code128, "CODE_128"),
            (Symbology::Ean13, "EAN_13"),
            (Symbology::QrCode, "QR_CODE"),
        ] {
            assert_eq!(symbology.to_string(), label);
            assert_eq!(Symbology::from_str(label).unwrap(), symbology);
            assert_eq!(
                serde_json::to_string(&symbology).unwrap(),
                format!("\"{}\"", label)
            );
        }
    }

    #[test]
    fn test_split_aim_prefix() {
        assert_eq!(
            Symbology::split_aim_prefix("]C0ABC-123"),
            Some((Symbology::Code128, "ABC-123"))
        );
        assert_eq!(
            Symbology::split_aim_prefix("]E496385074"),
            Some((Symbology::Ean8, "96385074"))
        );
        assert_eq!(
            Symbology::split_aim_prefix("]Q1https://example.org"),
            Some((Symbology::QrCode, "https://example.org"))
        );
    }

    #[test]
    fn test_split_aim_prefix_rejects_plain_payloads() {
        assert_eq!(Symbology::split_aim_prefix("ABC-123"), None);
        assert_eq!(Symbology::split_aim_prefix("]C"), None);
        assert_eq!(Symbology::split_aim_prefix("]X0abc"), None);
        assert_eq!(Symbology::split_aim_prefix("]C-abc"), None);
    }
}
