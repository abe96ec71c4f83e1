//! Launch targets and per-target broker routing.

use std::fmt;
use std::path::{Path, PathBuf};

/// File name of the only target class routed through the broker.
pub const BROKER_SENTINEL_NAME: &str = "elevate.exe";

/// A single launch request. Immutable for the duration of the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    path: PathBuf,
    request_elevation: bool,
}

impl LaunchTarget {
    /// Builds a launch request for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, request_elevation: bool) -> Self {
        Self {
            path: path.into(),
            request_elevation,
        }
    }

    /// Path of the executable to start.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the caller asked for elevation.
    #[must_use]
    pub const fn request_elevation(&self) -> bool {
        self.request_elevation
    }

    /// Returns the same target with the elevation request replaced.
    #[must_use]
    pub fn with_elevation(&self, request_elevation: bool) -> Self {
        Self {
            path: self.path.clone(),
            request_elevation,
        }
    }

    /// Whether this target must be mediated by the broker.
    #[must_use]
    pub fn requires_broker(&self) -> bool {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.eq_ignore_ascii_case(BROKER_SENTINEL_NAME))
    }
}

impl fmt::Display for LaunchTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.path.display())?;
        if self.request_elevation {
            formatter.write_str(" (as administrator)")?;
        }
        Ok(())
    }
}
