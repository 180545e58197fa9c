//! In-memory key-value storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tally_core::error::{Result, TallyError};
use tally_core::storage::KeyValueStorage;

/// Volatile storage for tests and `--ephemeral` runs.
///
/// Writes can be made to fail on demand to exercise persistence error paths.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStorage {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryKeyValueStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-populated with one value.
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage.lock().insert(key.to_string(), value.to_string());
        storage
    }

    /// Makes subsequent `set`/`remove` calls fail (simulates a full quota).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(TallyError::storage("Storage quota exceeded"))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStorage for MemoryKeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.lock().remove(key);
        Ok(())
    }
}
