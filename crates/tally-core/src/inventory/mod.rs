//! Inventory domain: scan records and the errors the store surfaces.

mod error;
mod model;

pub use error::InventoryError;
pub use model::{DEFAULT_FORMAT, RecordId, ScanRecord};
