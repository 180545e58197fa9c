//! Application layer: the inventory store, the scan session controller, and the
//! event channel both of them report to.

pub mod inventory;
pub mod session;
pub mod ui;

pub use inventory::{CsvExport, CsvOptions, InventoryStore};
pub use session::{SessionController, SessionSettings, StartOutcome};
pub use ui::UiEvents;
