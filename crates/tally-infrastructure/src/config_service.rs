//! Configuration service.
//!
//! Loads [`TallyConfig`] from `config.toml` (by default
//! `~/.config/tally/config.toml`), writing a default file when none exists.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use tally_core::config::TallyConfig;
use tally_core::error::{Result, TallyError};

use crate::paths::TallyPaths;
use crate::storage::AtomicFile;

/// Loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<TallyConfig>>>,
}

impl ConfigService {
    /// Creates a service reading from the platform config location.
    pub fn new() -> Result<Self> {
        let path = TallyPaths::default()
            .config_file()
            .map_err(|e| TallyError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a service reading from an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets the configuration, loading it from file if not cached.
    ///
    /// A malformed file is reported and replaced by defaults in memory; the file
    /// itself is left untouched so the user can fix it.
    pub fn get_config(&self) -> TallyConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load_config().unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), "Falling back to default configuration: {}", e);
            TallyConfig::default()
        });

        {
            let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    fn load_config(&self) -> Result<TallyConfig> {
        let file = AtomicFile::new(self.path.clone());

        match file.load()? {
            Some(content) => Ok(toml::from_str(&content)?),
            None => {
                let default_config = TallyConfig::default();
                let content = toml::to_string_pretty(&default_config)?;
                if let Err(e) = file.save(&content) {
                    tracing::warn!("Failed to write default configuration: {}", e);
                } else {
                    tracing::info!(path = %self.path.display(), "Created default configuration");
                }
                Ok(default_config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tally_core::engine::Symbology;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_creates_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::with_path(path.clone());

        let config = service.get_config();

        assert_eq!(config, TallyConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_reads_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[scanner]\ntarget_formats = [\"QR_CODE\"]\n[storage]\nkey = \"shelf_a\"\n",
        )
        .unwrap();

        let config = ConfigService::with_path(path).get_config();

        assert!(config.scanner.target_formats.contains(&Symbology::QrCode));
        assert_eq!(config.storage.key, "shelf_a");
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[scanner\nbroken").unwrap();

        let config = ConfigService::with_path(path.clone()).get_config();

        assert_eq!(config, TallyConfig::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[scanner\nbroken");
    }

    #[test]
    fn test_cache_and_invalidate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::with_path(path.clone());
        assert_eq!(service.get_config().export.delimiter, ';');

        fs::write(&path, "[export]\ndelimiter = \",\"\n").unwrap();
        assert_eq!(service.get_config().export.delimiter, ';');

        service.invalidate_cache();
        assert_eq!(service.get_config().export.delimiter, ',');
    }
}
