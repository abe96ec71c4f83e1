//! Runtime for the Elevator launcher.
//!
//! Loads configuration, installs telemetry and hands the launch arguments to
//! the bootstrap sequence, which either relaunches the executable through the
//! EPM client or runs the interactive shortcut session in-process. IO streams
//! and the configuration loader can be substituted in tests.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;

pub mod bootstrap;
mod config;
pub mod console;
pub mod session;
pub mod store;
pub mod telemetry;

pub use bootstrap::{
    Application, BootstrapPlan, OrchestrationError, ProcessControl, RelaunchError,
    SelfRelauncher, ServiceDeps, Settle, StartupContext, SystemRelauncher, ThreadSleep,
    run_elevator, run_elevator_with,
};
use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub use console::{Console, InputPoll};
pub use session::{Session, SessionError};
pub use store::{JsonShortcutStore, Shortcut, ShortcutStore, StoreError, default_shortcuts};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
}

/// Runs the launcher with the process arguments, including the program name.
///
/// Startup errors that occur before the presenter exists are written to
/// `stderr`.
pub fn run<I, E>(args: I, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    E: Write,
{
    run_with_loader(args, stderr, &OrthoConfigLoader, run_elevator)
}

fn run_with_loader<I, E, L, F>(args: I, stderr: &mut E, loader: &L, start: F) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    E: Write,
    L: ConfigLoader,
    F: FnOnce(&[String], &elevator_config::Config) -> ExitCode,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let prepared = loader.load(&split.config_arguments).and_then(|config| {
        telemetry::initialise(&config)?;
        Ok(config)
    });
    let config = match prepared {
        Ok(config) => config,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            return ExitCode::FAILURE;
        }
    };

    let launch_arguments: Vec<String> = args
        .iter()
        .skip(1)
        .map(|argument| argument.to_string_lossy().into_owned())
        .collect();
    start(&launch_arguments, &config)
}

#[cfg(test)]
mod tests;
