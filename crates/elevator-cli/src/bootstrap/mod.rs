//! Startup orchestration.
//!
//! Decides once whether this instance should relaunch itself through the
//! EPM client or run the interactive session in-process, and recovers from
//! startup failures by relaunching with `--direct-run`.

use std::any::Any;
use std::io::{self, BufReader};
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

use elevator_config::{Config, DataPaths};
use elevator_launch::{
    BrokerLocation, LaunchFlags, Presenter, ProcessTable, RoutingDecision,
    RoutingMode, RoutingState, SystemProcessTable, decide, recovery_arguments,
    relaunch_arguments,
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::console::Console;
use crate::session::{Session, SessionError};
use crate::store::JsonShortcutStore;

mod relaunch;
mod report;

pub use relaunch::{
    RelaunchError, SETTLE_DELAY, SelfRelauncher, Settle, SystemRelauncher, ThreadSleep,
};

pub(crate) const BOOTSTRAP_TARGET: &str = "elevator_cli::bootstrap";

const PERMISSION_ALERT: &str = "EPM Client error (0x8000FFFF). The application will now try to run directly.\n\nThis typically occurs if EPM Client cannot launch the application or there are permission issues.";

/// Immutable startup facts handed to the interactive application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupContext {
    /// Flags parsed from the command line.
    pub flags: LaunchFlags,
    /// How this instance came to run in-process.
    pub routing: RoutingDecision,
}

/// The interactive application run once startup settles in-process.
pub trait Application<P> {
    /// Runs until the user leaves.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the application cannot keep running.
    fn run(self, context: &StartupContext, presenter: &mut P) -> Result<(), SessionError>;
}

/// Failures of startup orchestration.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// A collaborator panicked while startup was being decided.
    #[error("startup panicked: {message}")]
    Panicked {
        /// Panic payload text.
        message: String,
    },
}

/// Process-level collaborators.
pub struct ProcessControl<T, R, S> {
    /// Location of the EPM client.
    pub broker: BrokerLocation,
    /// Process table used for ancestry checks.
    pub processes: T,
    /// Starts new instances of this executable.
    pub relauncher: R,
    /// Wait after a successful broker relaunch.
    pub settle: S,
}

/// User-facing collaborators.
pub struct ServiceDeps<P, A> {
    /// Presenter for alerts raised during startup.
    pub presenter: P,
    /// Application run in-process.
    pub application: A,
}

/// Collaborators required to start the launcher.
pub struct BootstrapPlan<T, R, S, P, A> {
    /// Process-level collaborators.
    pub process: ProcessControl<T, R, S>,
    /// User-facing collaborators.
    pub services: ServiceDeps<P, A>,
}

enum Startup {
    Relaunched,
    Interactive(StartupContext),
}

/// Starts the launcher with production collaborators.
///
/// `args` excludes the program name.
pub fn run_elevator(args: &[String], config: &Config) -> ExitCode {
    let console = Console::from_reader(BufReader::new(io::stdin()), io::stdout());
    let store = JsonShortcutStore::new(DataPaths::from_config(config));
    let plan = BootstrapPlan {
        process: ProcessControl {
            broker: BrokerLocation::system(),
            processes: SystemProcessTable::new(),
            relauncher: SystemRelauncher,
            settle: ThreadSleep::default(),
        },
        services: ServiceDeps {
            presenter: console,
            application: Session::new(store),
        },
    };
    run_elevator_with(plan, args)
}

/// Starts the launcher with injected collaborators.
pub fn run_elevator_with<T, R, S, P, A>(plan: BootstrapPlan<T, R, S, P, A>, args: &[String]) -> ExitCode
where
    T: ProcessTable,
    R: SelfRelauncher,
    S: Settle,
    P: Presenter,
    A: Application<P>,
{
    let BootstrapPlan { process, services } = plan;
    let ServiceDeps {
        mut presenter,
        application,
    } = services;
    let flags = LaunchFlags::from_args(args);
    info!(
        target: BOOTSTRAP_TARGET,
        direct_run = flags.direct_run,
        bypass = flags.bypass_broker,
        debug = flags.debug,
        "starting"
    );

    let startup = panic::catch_unwind(AssertUnwindSafe(|| {
        orchestrate(&process, flags, args, &mut presenter)
    }))
    .map_err(|payload| OrchestrationError::Panicked {
        message: panic_message(payload.as_ref()),
    });

    match startup {
        Ok(Startup::Relaunched) => ExitCode::SUCCESS,
        Ok(Startup::Interactive(context)) => match application.run(&context, &mut presenter) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                error!(target: BOOTSTRAP_TARGET, error = %error, "session failed");
                ExitCode::FAILURE
            }
        },
        Err(error) => recover(&process.relauncher, flags, args, &error, &mut presenter),
    }
}

fn orchestrate<T, R, S, P>(
    process: &ProcessControl<T, R, S>,
    flags: LaunchFlags,
    args: &[String],
    presenter: &mut P,
) -> Startup
where
    T: ProcessTable,
    R: SelfRelauncher,
    S: Settle,
    P: Presenter,
{
    let mut routing = RoutingState::new();
    let decision = routing
        .resolve(|| decide(flags, &process.broker, &process.processes))
        .clone();
    if flags.debug {
        let report = report::identity_report(&process.processes, &process.broker, &decision);
        presenter.alert("Debug Info", &report);
    }

    let mode = decision.mode;
    let context = StartupContext {
        flags,
        routing: decision,
    };
    if mode != RoutingMode::ThroughBroker {
        return Startup::Interactive(context);
    }

    let Some(executable) = process.relauncher.current_executable() else {
        warn!(target: BOOTSTRAP_TARGET, "current executable unknown; running in-process");
        presenter.alert("Error", "Failed to determine application path");
        return Startup::Interactive(context);
    };

    let arguments = relaunch_arguments(args);
    match process
        .relauncher
        .through_broker(process.broker.path(), &executable, &arguments)
    {
        Ok(()) => {
            process.settle.settle();
            Startup::Relaunched
        }
        Err(error) if error.is_permission_denied() => {
            warn!(target: BOOTSTRAP_TARGET, error = %error, "EPM client refused relaunch");
            presenter.alert("EPM Launch Error", PERMISSION_ALERT);
            Startup::Interactive(context)
        }
        Err(error) => {
            warn!(target: BOOTSTRAP_TARGET, error = %error, "relaunch through EPM client failed");
            presenter.alert(
                "Error",
                &format!(
                    "Failed to launch through EPM Client: {error}\n\nThe application will try to run normally."
                ),
            );
            Startup::Interactive(context)
        }
    }
}

fn recover<R, P>(
    relauncher: &R,
    flags: LaunchFlags,
    args: &[String],
    failure: &OrchestrationError,
    presenter: &mut P,
) -> ExitCode
where
    R: SelfRelauncher,
    P: Presenter,
{
    error!(target: BOOTSTRAP_TARGET, error = %failure, "startup failed");
    presenter.alert(
        "Application Error",
        &format!("Critical error starting application: {failure}"),
    );
    if flags.direct_run {
        return ExitCode::FAILURE;
    }

    let Some(executable) = relauncher.current_executable() else {
        error!(target: BOOTSTRAP_TARGET, "cannot relaunch: current executable unknown");
        return ExitCode::FAILURE;
    };
    match relauncher.direct(&executable, &recovery_arguments(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(target: BOOTSTRAP_TARGET, error = %error, "direct relaunch failed");
            ExitCode::FAILURE
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}
