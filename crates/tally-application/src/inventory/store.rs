use chrono::{Local, NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tally_core::inventory::{InventoryError, RecordId, ScanRecord};
use tally_core::storage::KeyValueStorage;

use super::csv::{self, CsvExport, CsvOptions};
use super::id::RecordIdGenerator;
use crate::ui::UiEvents;

struct Inventory {
    /// Newest first.
    records: Vec<ScanRecord>,
    ids: RecordIdGenerator,
}

/// Ordered collection of scan records, persisted in full after every change.
///
/// `InventoryStore` is responsible for:
/// - Loading the collection once at construction (never failing)
/// - Prepending new records and handing out their ids
/// - Deleting by id and clearing
/// - Writing the whole collection back to storage after each mutation
/// - Rendering the CSV export
///
/// Storage failures are logged and otherwise ignored: the in-memory collection
/// stays authoritative for the rest of the process.
pub struct InventoryStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    events: UiEvents,
    inventory: Mutex<Inventory>,
}

impl InventoryStore {
    /// Loads the collection stored under `key`.
    ///
    /// Missing data yields an empty inventory; unreadable or malformed data does too,
    /// with a warning. Emits `InventoryChanged` with whatever was loaded.
    pub fn open(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>, events: UiEvents) -> Self {
        let key = key.into();
        let mut records = Self::load(storage.as_ref(), &key);
        let mut ids = RecordIdGenerator::after(
            records.iter().map(|r| &r.id).filter(|id| **id <= RecordId::MAX),
        );
        let mut rekeyed = 0;
        for record in records.iter_mut().filter(|r| r.id > RecordId::MAX) {
            record.id = ids.next(record.observed_at);
            rekeyed += 1;
        }
        if rekeyed > 0 {
            tracing::warn!(key = %key, rekeyed, "Assigned new ids to stored records with out-of-range ids");
        }
        tracing::info!(key = %key, count = records.len(), "Inventory loaded");

        let store = Self {
            storage,
            key,
            events,
            inventory: Mutex::new(Inventory { records, ids }),
        };
        store.events.inventory_changed(store.records());
        store
    }

    fn load(storage: &dyn KeyValueStorage, key: &str) -> Vec<ScanRecord> {
        let raw = match storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key, "Failed to read inventory, starting empty: {}", e);
                return Vec::new();
            }
        };

        let parsed: Vec<ScanRecord> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(key, "Stored inventory is malformed, starting empty: {}", e);
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let total = parsed.len();
        let records: Vec<ScanRecord> = parsed
            .into_iter()
            .filter(|r| !r.code.trim().is_empty() && seen.insert(r.id))
            .collect();
        if records.len() != total {
            tracing::warn!(
                key,
                dropped = total - records.len(),
                "Dropped stored records with empty codes or duplicate ids"
            );
        }
        records
    }

    fn lock(&self) -> MutexGuard<'_, Inventory> {
        self.inventory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a new scan at the front of the collection.
    ///
    /// `format` falls back to `CODE_128` when absent.
    pub fn insert(&self, code: &str, format: Option<&str>) -> Result<ScanRecord, InventoryError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(InventoryError::EmptyCode);
        }

        let mut inventory = self.lock();
        let now = Utc::now();
        let record = ScanRecord::new(inventory.ids.next(now), code, format, now);
        inventory.records.insert(0, record.clone());
        tracing::info!(id = %record.id, code = %record.code, format = %record.format, "Recorded scan");

        self.commit(&inventory.records);
        Ok(record)
    }

    /// Removes the record with `id`. Returns `false` (and changes nothing) if no
    /// record matches.
    pub fn delete_by_id(&self, id: RecordId) -> bool {
        let mut inventory = self.lock();
        let before = inventory.records.len();
        inventory.records.retain(|r| r.id != id);
        if inventory.records.len() == before {
            tracing::debug!(%id, "Delete ignored, no such record");
            return false;
        }

        tracing::info!(%id, "Deleted scan");
        self.commit(&inventory.records);
        true
    }

    /// Empties the collection. Confirming intent is the caller's job.
    pub fn clear(&self) {
        let mut inventory = self.lock();
        let removed = inventory.records.len();
        inventory.records.clear();
        tracing::info!(removed, "Cleared inventory");
        self.commit(&inventory.records);
    }

    /// Snapshot of the collection, newest first.
    pub fn records(&self) -> Vec<ScanRecord> {
        self.lock().records.clone()
    }

    pub fn get(&self, id: RecordId) -> Option<ScanRecord> {
        self.lock().records.iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Renders the collection, newest first, with dates in local time.
    pub fn to_csv(&self, options: &CsvOptions) -> Result<String, InventoryError> {
        let inventory = self.lock();
        if inventory.records.is_empty() {
            return Err(InventoryError::EmptyExport);
        }
        Ok(csv::render(&inventory.records, options.delimiter, &Local))
    }

    /// Renders the export together with its dated file name.
    pub fn export_csv(
        &self,
        options: &CsvOptions,
        today: NaiveDate,
    ) -> Result<CsvExport, InventoryError> {
        let content = self.to_csv(options)?;
        Ok(CsvExport {
            filename: options.filename(today),
            content,
        })
    }

    /// Persists and announces the new collection. Called with the lock held so
    /// concurrent mutations are written in the order they happened.
    fn commit(&self, records: &[ScanRecord]) {
        self.persist(records);
        self.events.inventory_changed(records.to_vec());
    }

    fn persist(&self, records: &[ScanRecord]) {
        let serialized = match serde_json::to_string(records) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::warn!(key = %self.key, "Failed to serialize inventory: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &serialized) {
            tracing::warn!(key = %self.key, "Failed to persist inventory: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::inventory::DEFAULT_FORMAT;
    use tally_core::session::UiEvent;
    use tally_infrastructure::storage::MemoryKeyValueStorage;

    const KEY: &str = "barcode_inventory";

    fn open(storage: &Arc<MemoryKeyValueStorage>) -> InventoryStore {
        InventoryStore::open(storage.clone(), KEY, UiEvents::detached())
    }

    fn codes(store: &InventoryStore) -> Vec<String> {
        store.records().into_iter().map(|r| r.code).collect()
    }

    #[test]
    fn test_insert_order_is_newest_first() {
        let store = open(&Arc::new(MemoryKeyValueStorage::new()));

        store.insert("A", None).unwrap();
        store.insert("B", None).unwrap();
        store.insert("C", None).unwrap();

        assert_eq!(codes(&store), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_insert_returns_record_with_unique_id() {
        let store = open(&Arc::new(MemoryKeyValueStorage::new()));

        let a = store.insert("A", None).unwrap();
        let b = store.insert("A", Some("EAN_13")).unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.format, DEFAULT_FORMAT);
        assert_eq!(b.format, "EAN_13");
        assert_eq!(store.get(b.id), Some(b));
    }

    #[test]
    fn test_insert_rejects_empty_code() {
        let store = open(&Arc::new(MemoryKeyValueStorage::new()));

        assert_eq!(store.insert("", None), Err(InventoryError::EmptyCode));
        assert_eq!(store.insert("   ", None), Err(InventoryError::EmptyCode));
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_by_id_is_exact() {
        let store = open(&Arc::new(MemoryKeyValueStorage::new()));
        let a = store.insert("A", None).unwrap();
        store.insert("B", None).unwrap();

        assert!(!store.delete_by_id(RecordId(42)));
        assert_eq!(codes(&store), vec!["B", "A"]);

        assert!(store.delete_by_id(a.id));
        assert_eq!(codes(&store), vec!["B"]);
    }

    #[test]
    fn test_clear() {
        let storage = Arc::new(MemoryKeyValueStorage::new());
        let store = open(&storage);
        store.insert("A", None).unwrap();

        store.clear();

        assert!(store.is_empty());
        assert_eq!(storage.get(KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_persistence_round_trip() {
        let storage = Arc::new(MemoryKeyValueStorage::new());
        open(&storage).insert("X", None).unwrap();

        let reopened = open(&storage);

        assert_eq!(codes(&reopened), vec!["X"]);
    }

    #[test]
    fn test_ids_continue_after_reload() {
        let storage = Arc::new(MemoryKeyValueStorage::new());
        let first = open(&storage).insert("X", None).unwrap();

        let second = open(&storage).insert("Y", None).unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let storage = Arc::new(MemoryKeyValueStorage::with_value(KEY, "{not json"));

        let store = open(&storage);

        assert!(store.is_empty());
        // Usable afterwards; the next write replaces the corrupt value.
        store.insert("A", None).unwrap();
        assert_eq!(codes(&open(&storage)), vec!["A"]);
    }

    #[test]
    fn test_load_drops_invalid_records() {
        let stored = r#"[
            {"id":3,"code":"C","timestamp":"2024-06-10T08:30:00Z"},
            {"id":2,"code":"","timestamp":"2024-06-10T08:29:00Z"},
            {"id":3,"code":"dup","timestamp":"2024-06-10T08:28:00Z"},
            {"id":1,"code":"A","format":"EAN_8","timestamp":"2024-06-10T08:27:00Z"}
        ]"#;
        let storage = Arc::new(MemoryKeyValueStorage::with_value(KEY, stored));

        let store = open(&storage);

        assert_eq!(codes(&store), vec!["C", "A"]);
        assert_eq!(store.records()[1].format, "EAN_8");
    }

    #[test]
    fn test_out_of_range_stored_id_is_rekeyed() {
        let stored = r#"[
            {"id":18446744073709551615,"code":"A","timestamp":"2024-06-10T08:30:00Z"},
            {"id":5,"code":"B","timestamp":"2024-06-10T08:29:00Z"}
        ]"#;
        let storage = Arc::new(MemoryKeyValueStorage::with_value(KEY, stored));
        let store = open(&storage);

        let loaded = store.records();
        assert_eq!(codes(&store), vec!["A", "B"]);
        assert!(loaded[0].id <= RecordId::MAX);
        assert_ne!(loaded[0].id, loaded[1].id);

        let c = store.insert("C", None).unwrap();
        let d = store.insert("D", None).unwrap();

        let mut ids: Vec<RecordId> = store.records().iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert!(d.id > c.id);
        assert!(store.delete_by_id(loaded[0].id));
    }

    #[test]
    fn test_failed_persist_keeps_memory_state() {
        let storage = Arc::new(MemoryKeyValueStorage::new());
        let store = open(&storage);
        storage.set_fail_writes(true);

        store.insert("A", None).unwrap();

        assert_eq!(codes(&store), vec!["A"]);
        assert_eq!(storage.get(KEY).unwrap(), None);
    }

    #[test]
    fn test_csv_export_shape() {
        let store = open(&Arc::new(MemoryKeyValueStorage::new()));
        store.insert("111", Some("CODE_128")).unwrap();
        store.insert("222", Some("CODE_128")).unwrap();

        let csv = store.to_csv(&CsvOptions::default()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "code;format;date;time");
        assert!(lines[1].starts_with("222;CODE_128;"));
        assert!(lines[2].starts_with("111;CODE_128;"));
    }

    #[test]
    fn test_empty_export_guard() {
        let store = open(&Arc::new(MemoryKeyValueStorage::new()));

        assert_eq!(
            store.to_csv(&CsvOptions::default()),
            Err(InventoryError::EmptyExport)
        );
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(
            store.export_csv(&CsvOptions::default(), today),
            Err(InventoryError::EmptyExport)
        );
    }

    #[test]
    fn test_export_names_file_by_date() {
        let store = open(&Arc::new(MemoryKeyValueStorage::new()));
        store.insert("111", None).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        let export = store.export_csv(&CsvOptions::default(), today).unwrap();

        assert_eq!(export.filename, "scan-2024-06-10.csv");
        assert!(export.content.starts_with("code;format;date;time\n111;"));
    }

    #[test]
    fn test_mutations_emit_inventory_changed() {
        let (events, mut receiver) = UiEvents::channel();
        let store = InventoryStore::open(Arc::new(MemoryKeyValueStorage::new()), KEY, events);
        let record = store.insert("A", None).unwrap();
        store.delete_by_id(RecordId(1));
        store.delete_by_id(record.id);

        let mut sizes = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            match event {
                UiEvent::InventoryChanged { records } => sizes.push(records.len()),
                other => panic!("unexpected event {:?}", other),
            }
        }
        // load, insert, delete (the miss emits nothing)
        assert_eq!(sizes, vec![0, 1, 0]);
    }
}
