//! Broker and direct process starts.
//!
//! [`EpmBrokerInvoker`] hands a target to the EPM client stub and waits for the
//! stub to finish, which can take as long as the user leaves its consent
//! dialog open. [`ShellDirectInvoker`] starts a target through the platform's
//! shell-integrated launcher, attaching an elevation request when asked.
//! Both return a [`LaunchOutcome`] rather than an error so the dispatcher can
//! select a fallback by variant.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::broker::{BrokerAvailability, BrokerLocation};
use crate::outcome::{LaunchOutcome, classify_broker_failure};
use crate::target::LaunchTarget;

mod shell;

/// Tracing target for invocation events.
const INVOKE_TARGET: &str = "elevator_launch::invoke";

/// Starts a target through the elevation broker.
///
/// Implementations run on worker threads and must therefore be shareable.
pub trait BrokerInvoker: Send + Sync {
    /// Starts the broker for `target` and classifies the result.
    fn invoke(&self, target: &Path) -> LaunchOutcome;
}

/// Starts a target without the broker.
pub trait DirectInvoker {
    /// Starts `target`, requesting elevation when the target asks for it.
    fn invoke(&self, target: &LaunchTarget) -> LaunchOutcome;
}

/// [`BrokerInvoker`] driving the EPM client stub.
#[derive(Debug, Clone)]
pub struct EpmBrokerInvoker {
    location: BrokerLocation,
}

impl EpmBrokerInvoker {
    /// Builds an invoker for the broker at `location`.
    #[must_use]
    pub const fn new(location: BrokerLocation) -> Self {
        Self { location }
    }

    /// Broker location used by this invoker.
    #[must_use]
    pub const fn location(&self) -> &BrokerLocation {
        &self.location
    }
}

impl Default for EpmBrokerInvoker {
    fn default() -> Self {
        Self::new(BrokerLocation::system())
    }
}

impl BrokerInvoker for EpmBrokerInvoker {
    fn invoke(&self, target: &Path) -> LaunchOutcome {
        if !self.location.is_broker_present() {
            return LaunchOutcome::BrokerUnavailable;
        }
        if !target.is_file() {
            return LaunchOutcome::TargetMissing;
        }

        debug!(
            target: INVOKE_TARGET,
            broker = %self.location.path().display(),
            launch = %target.display(),
            "starting broker"
        );
        // The broker shares no output with the console; its stderr is kept
        // for the failure text.
        let finished = Command::new(self.location.path())
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        match finished {
            Ok(output) if output.status.success() => LaunchOutcome::Success,
            Ok(output) => {
                let code = output.status.code();
                let message = broker_failure_text(code, &output.stderr);
                warn!(target: INVOKE_TARGET, ?code, "broker reported failure");
                classify_broker_failure(&message, code)
            }
            Err(error) => {
                warn!(target: INVOKE_TARGET, error = %error, "broker failed to start");
                classify_broker_failure(&error.to_string(), error.raw_os_error())
            }
        }
    }
}

fn broker_failure_text(code: Option<i32>, stderr: &[u8]) -> String {
    let status = code.map_or_else(
        || String::from("broker terminated without an exit code"),
        |value| format!("broker exited with status {value} (0x{value:08X})"),
    );
    let captured = String::from_utf8_lossy(stderr);
    match captured.trim() {
        "" => status,
        detail => format!("{status}: {detail}"),
    }
}

/// [`DirectInvoker`] using the platform's shell-integrated process start.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellDirectInvoker;

impl ShellDirectInvoker {
    /// Builds the direct invoker.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DirectInvoker for ShellDirectInvoker {
    fn invoke(&self, target: &LaunchTarget) -> LaunchOutcome {
        debug!(
            target: INVOKE_TARGET,
            launch = %target.path().display(),
            elevated = target.request_elevation(),
            "starting target directly"
        );
        match shell::start(target) {
            Ok(()) => LaunchOutcome::Success,
            Err(message) => {
                warn!(target: INVOKE_TARGET, %message, "direct start failed");
                LaunchOutcome::DirectFailure(message)
            }
        }
    }
}
