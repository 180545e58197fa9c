use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tally_application::{InventoryStore, UiEvents};
use tally_core::config::TallyConfig;
use tally_core::storage::KeyValueStorage;
use tally_infrastructure::{
    ConfigService, FileKeyValueStorage, MemoryKeyValueStorage, TallyPaths,
};

/// Configuration and storage wiring shared by every command.
pub struct AppContext {
    pub config: TallyConfig,
    config_path: PathBuf,
    paths: TallyPaths,
    ephemeral: bool,
}

impl AppContext {
    pub fn load(config_path: Option<&Path>, ephemeral: bool) -> Result<Self> {
        let service = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new().context("Failed to locate the configuration file")?,
        };

        // The global subscriber depends on this config, so report loading problems
        // through a temporary one.
        let early = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        let config = tracing::subscriber::with_default(early, || service.get_config());

        Ok(Self {
            config,
            config_path: service.path().clone(),
            paths: TallyPaths::default(),
            ephemeral,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Directory for rolling log files, when file logging is enabled.
    pub fn log_dir(&self) -> Result<Option<PathBuf>> {
        if !self.config.logging.file {
            return Ok(None);
        }
        Ok(Some(self.paths.logs_dir()?))
    }

    fn storage(&self) -> Result<Arc<dyn KeyValueStorage>> {
        if self.ephemeral {
            return Ok(Arc::new(MemoryKeyValueStorage::new()));
        }

        let dir = match &self.config.storage.dir {
            Some(dir) => dir.clone(),
            None => self.paths.storage_dir()?,
        };
        Ok(Arc::new(FileKeyValueStorage::new(dir)))
    }

    pub fn open_store(&self, events: UiEvents) -> Result<Arc<InventoryStore>> {
        let storage = self.storage()?;
        Ok(Arc::new(InventoryStore::open(
            storage,
            self.config.storage.key.clone(),
            events,
        )))
    }
}
