//! Derives the per-user data paths used by the launcher.
//!
//! The shortcut list lives beneath the platform configuration directory
//! (`%APPDATA%` on Windows, `$XDG_CONFIG_HOME` elsewhere) unless the
//! configuration points it somewhere else.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::Config;
use crate::defaults::{SHORTCUTS_DIRECTORY, SHORTCUTS_FILE_NAME};

/// Canonical locations of launcher data files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    data_dir: PathBuf,
    shortcuts_path: PathBuf,
}

impl DataPaths {
    /// Derives data paths from the shared configuration without touching the
    /// filesystem.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        match config.shortcuts_path() {
            Some(path) => {
                let shortcuts_path = path.as_std_path().to_path_buf();
                let data_dir = shortcuts_path
                    .parent()
                    .filter(|parent| !parent.as_os_str().is_empty())
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
                Self {
                    data_dir,
                    shortcuts_path,
                }
            }
            None => {
                let data_dir = default_data_directory();
                Self {
                    shortcuts_path: data_dir.join(SHORTCUTS_FILE_NAME),
                    data_dir,
                }
            }
        }
    }

    /// Creates the data directory so the shortcut list can be written.
    ///
    /// # Errors
    ///
    /// Returns [`DataPathsError::DataDirectory`] when the directory cannot be
    /// created.
    pub fn prepare(&self) -> Result<(), DataPathsError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| DataPathsError::DataDirectory {
            path: self.data_dir.clone(),
            source,
        })
    }

    /// Directory holding launcher data.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.data_dir.as_path()
    }

    /// Path to the persisted shortcut list.
    #[must_use]
    pub fn shortcuts_path(&self) -> &Path {
        self.shortcuts_path.as_path()
    }
}

fn default_data_directory() -> PathBuf {
    let mut dir = dirs::config_dir().unwrap_or_else(env::temp_dir);
    dir.push(SHORTCUTS_DIRECTORY);
    dir
}

/// Errors raised while preparing launcher data paths.
#[derive(Debug, Error)]
pub enum DataPathsError {
    /// Creating the data directory failed.
    #[error("failed to prepare data directory {path:?}: {source}")]
    DataDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}
