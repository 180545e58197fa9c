//! Durable key-value text storage.

use crate::error::Result;

/// Application-scoped text storage that survives restarts.
///
/// Writes are synchronous: when `set` returns `Ok`, the value is what a fresh
/// process will read back.
pub trait KeyValueStorage: Send + Sync {
    /// Reads the value stored under `key`, `None` if nothing was ever stored.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
