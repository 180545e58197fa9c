use thiserror::Error;

/// Failures the inventory reports back to its caller.
///
/// Persistence problems are not reported here: the store logs them and keeps
/// serving from memory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// A scan with an empty payload was offered for insertion.
    #[error("Barcode payload is empty")]
    EmptyCode,

    /// Export was requested while the inventory holds no records.
    #[error("Nothing to export")]
    EmptyExport,
}
