/// Default log filter expression used by the launcher.
///
/// The console shares stderr with the logs, so only warnings surface unless
/// the operator asks for more.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Directory created beneath the per-user configuration directory.
pub const SHORTCUTS_DIRECTORY: &str = "Elevator";

/// File name of the persisted shortcut list.
pub const SHORTCUTS_FILE_NAME: &str = "shortcuts.json";

/// Default log filter expression used by the launcher.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the launcher.
#[must_use]
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}
