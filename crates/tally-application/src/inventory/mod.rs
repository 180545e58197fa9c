//! The inventory store and its CSV export.

mod csv;
mod id;
mod store;

pub use csv::{CsvExport, CsvOptions};
pub use store::InventoryStore;
