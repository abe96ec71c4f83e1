//! Starting another instance of the launcher.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use elevator_launch::{PermissionSignature, broker_argument_string};
use thiserror::Error;
use tracing::{debug, info};

use super::BOOTSTRAP_TARGET;

/// Pause after a successful broker relaunch before this instance exits.
pub const SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Errors raised while starting another instance.
#[derive(Debug, Error)]
pub enum RelaunchError {
    /// The process could not be started.
    #[error("failed to start {}: {source}", .program.display())]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl RelaunchError {
    /// Whether the failure carries the broker's permission signature.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Spawn { source, .. } => {
                PermissionSignature::matches(&source.to_string(), source.raw_os_error())
            }
        }
    }
}

/// Starts new instances of the current executable.
pub trait SelfRelauncher {
    /// Path of the running executable, when it can be determined.
    fn current_executable(&self) -> Option<PathBuf>;

    /// Starts `executable` through the broker at `broker`. Returns once the
    /// broker has been started.
    ///
    /// # Errors
    ///
    /// Returns [`RelaunchError`] when the broker cannot be started.
    fn through_broker(
        &self,
        broker: &Path,
        executable: &Path,
        arguments: &[String],
    ) -> Result<(), RelaunchError>;

    /// Starts `executable` with `arguments` as a plain process.
    ///
    /// # Errors
    ///
    /// Returns [`RelaunchError`] when the process cannot be started.
    fn direct(&self, executable: &Path, arguments: &[String]) -> Result<(), RelaunchError>;
}

/// [`SelfRelauncher`] spawning real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRelauncher;

impl SelfRelauncher for SystemRelauncher {
    fn current_executable(&self) -> Option<PathBuf> {
        env::current_exe()
            .inspect_err(|error| {
                debug!(target: BOOTSTRAP_TARGET, error = %error, "current executable unknown");
            })
            .ok()
    }

    fn through_broker(
        &self,
        broker: &Path,
        executable: &Path,
        arguments: &[String],
    ) -> Result<(), RelaunchError> {
        let mut command = Command::new(broker);
        push_broker_arguments(&mut command, executable, arguments);
        spawn_detached(command, broker)
    }

    fn direct(&self, executable: &Path, arguments: &[String]) -> Result<(), RelaunchError> {
        let mut command = Command::new(executable);
        command.args(arguments);
        spawn_detached(command, executable)
    }
}

/// The broker receives the executable and one string holding every quoted
/// argument. Windows gets the text raw so the quoting survives intact.
#[cfg(windows)]
fn push_broker_arguments(command: &mut Command, executable: &Path, arguments: &[String]) {
    use std::os::windows::process::CommandExt;

    command.raw_arg(format!(
        "\"{}\" {}",
        executable.display(),
        broker_argument_string(arguments)
    ));
}

#[cfg(not(windows))]
fn push_broker_arguments(command: &mut Command, executable: &Path, arguments: &[String]) {
    command
        .arg(executable)
        .arg(broker_argument_string(arguments));
}

/// Starts `command` without waiting for it. The new instance takes over this
/// process's console, stdin included.
fn spawn_detached(mut command: Command, program: &Path) -> Result<(), RelaunchError> {
    let child = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| RelaunchError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;
    info!(
        target: BOOTSTRAP_TARGET,
        program = %program.display(),
        pid = child.id(),
        "relaunched"
    );
    Ok(())
}

/// Blocking wait after a successful broker relaunch.
pub trait Settle {
    /// Blocks until the relaunched instance has had time to start.
    fn settle(&self);
}

/// [`Settle`] that sleeps the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadSleep {
    delay: Duration,
}

impl ThreadSleep {
    /// Builds a settle step sleeping for `delay`.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for ThreadSleep {
    fn default() -> Self {
        Self::new(SETTLE_DELAY)
    }
}

impl Settle for ThreadSleep {
    fn settle(&self) {
        thread::sleep(self.delay);
    }
}
