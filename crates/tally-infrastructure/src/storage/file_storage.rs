//! File-backed key-value storage: one JSON document per key.

use std::path::{Path, PathBuf};

use tally_core::error::{Result, TallyError};
use tally_core::storage::KeyValueStorage;

use super::AtomicFile;

/// Stores each key as `<dir>/<key>.json`, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileKeyValueStorage {
    dir: PathBuf,
}

impl FileKeyValueStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> Result<AtomicFile> {
        if key.is_empty() {
            return Err(TallyError::storage("Storage key must not be empty"));
        }
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Ok(AtomicFile::new(self.dir.join(format!("{}.json", file_name))))
    }
}

impl KeyValueStorage for FileKeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.file_for(key)?.load()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.file_for(key)?.save(value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.file_for(key)?.remove()
    }
}
