//! Shared configuration for the Elevator launcher.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, an optional
//! TOML file selected with `--config-path`, `ELEVATOR_*` environment variables
//! and finally command-line flags. The launcher splits these flags from its
//! own launch flags before loading so relaunches can forward both untouched.

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod paths;

pub use defaults::{
    DEFAULT_LOG_FILTER, SHORTCUTS_DIRECTORY, SHORTCUTS_FILE_NAME, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use paths::{DataPaths, DataPathsError};

/// Command-line flags consumed by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of [`Config`]. The launcher uses
/// this list to separate configuration flags from launch flags.
pub const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--shortcuts-path",
];

/// Resolved launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "ELEVATOR")]
pub struct Config {
    /// Tracing filter expression, for example `warn` or `elevator_launch=debug`.
    #[ortho_config(default = default_log_filter_string())]
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for structured logs written to stderr.
    #[ortho_config(default = default_log_format())]
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Overrides the location of the persisted shortcut list.
    #[serde(default)]
    pub shortcuts_path: Option<Utf8PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            shortcuts_path: None,
        }
    }
}

impl Config {
    /// Tracing filter expression applied to the subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Explicit shortcut file override, if one was configured.
    #[must_use]
    pub fn shortcuts_path(&self) -> Option<&Utf8PathBuf> {
        self.shortcuts_path.as_ref()
    }
}
