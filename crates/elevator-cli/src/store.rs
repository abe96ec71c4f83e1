//! Persisted shortcut list.
//!
//! Shortcuts are stored as a JSON array of `{ "Key": .., "Path": .. }`
//! records. A missing file is not an error: the built-in defaults are
//! returned instead and only written once the user changes the list.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use elevator_config::{DataPaths, DataPathsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const STORE_TARGET: &str = "elevator_cli::store";

/// A single-key binding to an executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Shortcut {
    /// Key typed to launch the shortcut. Compared case-insensitively.
    pub key: String,
    /// Executable started by the shortcut.
    pub path: PathBuf,
}

impl Shortcut {
    /// Builds a shortcut.
    #[must_use]
    pub fn new(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
        }
    }

    /// Whether this shortcut is bound to `key`, ignoring case.
    #[must_use]
    pub fn matches_key(&self, key: &str) -> bool {
        self.key.to_lowercase() == key.to_lowercase()
    }
}

/// Shortcuts offered before the user has saved a list of their own.
#[must_use]
pub fn default_shortcuts() -> Vec<Shortcut> {
    vec![
        Shortcut::new(
            "v",
            r"C:\Program Files\Microsoft Visual Studio\2022\Professional\Common7\IDE\devenv.exe",
        ),
        Shortcut::new(
            "e",
            r"C:\Program Files\Microsoft Visual Studio\2022\Enterprise\Common7\IDE\devenv.exe",
        ),
        Shortcut::new("x", "explorer.exe"),
        Shortcut::new("i", r"C:\Windows\system32\inetsrv\inetmgr.exe"),
    ]
}

/// Errors raised while reading or writing the shortcut file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The shortcut file could not be read.
    #[error("failed to read {path:?}: {source}")]
    Read {
        /// Shortcut file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The shortcut file is not a valid shortcut list.
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        /// Shortcut file path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The data directory could not be created.
    #[error(transparent)]
    Prepare(#[from] DataPathsError),
    /// The shortcut list could not be serialised.
    #[error("failed to serialise shortcuts: {0}")]
    Serialise(#[source] serde_json::Error),
    /// The shortcut file could not be written.
    #[error("failed to write {path:?}: {source}")]
    Write {
        /// Shortcut file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Loads and saves the shortcut list.
pub trait ShortcutStore {
    /// Loads the saved shortcuts, or the defaults when nothing is saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when an existing file cannot be read or parsed.
    fn load(&self) -> Result<Vec<Shortcut>, StoreError>;

    /// Replaces the saved shortcuts with `shortcuts`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the file cannot be written.
    fn save(&self, shortcuts: &[Shortcut]) -> Result<(), StoreError>;
}

/// [`ShortcutStore`] backed by a JSON file in the data directory.
#[derive(Debug, Clone)]
pub struct JsonShortcutStore {
    paths: DataPaths,
}

impl JsonShortcutStore {
    /// Creates a store using the shortcut file named by `paths`.
    #[must_use]
    pub const fn new(paths: DataPaths) -> Self {
        Self { paths }
    }

    /// Location of the shortcut file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.paths.shortcuts_path()
    }
}

impl ShortcutStore for JsonShortcutStore {
    fn load(&self) -> Result<Vec<Shortcut>, StoreError> {
        let path = self.path();
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(target: STORE_TARGET, path = %path.display(), "no saved shortcuts; using defaults");
                return Ok(default_shortcuts());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&json).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save(&self, shortcuts: &[Shortcut]) -> Result<(), StoreError> {
        self.paths.prepare()?;
        let json = serde_json::to_string_pretty(shortcuts).map_err(StoreError::Serialise)?;
        let path = self.path();
        fs::write(path, json).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(target: STORE_TARGET, path = %path.display(), count = shortcuts.len(), "shortcuts saved");
        Ok(())
    }
}
