//! Unified path management for tally configuration, storage and logs.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/tally/             # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/tally/        # Data directory
//! ├── storage/                 # Key-value storage, one file per key
//! │   └── barcode_inventory.json
//! └── logs/                    # Application logs
//!     └── tally.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

const APP_DIR: &str = "tally";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves where tally keeps its files.
///
/// With a base directory (tests, portable installs) everything lives under it;
/// otherwise the platform config and data directories are used.
#[derive(Debug, Clone, Default)]
pub struct TallyPaths {
    base: Option<PathBuf>,
}

impl TallyPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory (e.g. `~/.config/tally/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.join("config")),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the data directory (e.g. `~/.local/share/tally/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.join("data")),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn storage_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("storage"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("logs"))
    }
}
