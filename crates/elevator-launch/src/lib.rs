//! Launch orchestration for the Elevator application launcher.
//!
//! The `elevator-launch` crate decides how programs get started on a machine
//! where an Endpoint Privilege Management (EPM) client mediates elevation.
//! The client is a third-party broker executable installed at a fixed path;
//! launching a program through it lets the user approve elevation without
//! holding administrator rights.
//!
//! Two decisions live here:
//!
//! - **Process routing.** On startup, [`routing::decide`] chooses between
//!   running the interactive application in this process and relaunching this
//!   executable through the broker first. It looks at launch flags, broker
//!   presence and, via [`ancestry::ProcessTable`], whether the broker is
//!   already the parent process.
//! - **Per-target dispatch.** At runtime, [`dispatch::LaunchDispatcher`]
//!   starts each requested target, routing only the `elevate.exe` sentinel
//!   through the broker and falling back to a direct start when the broker
//!   fails in a known-safe way.
//!
//! Process starts are behind [`invoke::BrokerInvoker`] and
//! [`invoke::DirectInvoker`] so both decisions can be exercised without
//! spawning anything.
//!
//! # Example
//!
//! ```rust,no_run
//! use elevator_launch::{BrokerLocation, LaunchFlags, SystemProcessTable, decide};
//!
//! let args: Vec<String> = std::env::args().skip(1).collect();
//! let decision = decide(
//!     LaunchFlags::from_args(&args),
//!     &BrokerLocation::system(),
//!     &SystemProcessTable::new(),
//! );
//! println!("{} ({})", decision.mode, decision.reason);
//! ```

pub mod ancestry;
pub mod broker;
pub mod dispatch;
pub mod flags;
pub mod invoke;
pub mod outcome;
pub mod presenter;
pub mod routing;
pub mod target;

#[cfg(test)]
mod tests;

pub use self::ancestry::{ProcessIdentity, ProcessTable, SystemProcessTable, parse_query_output};
pub use self::broker::{
    BROKER_PATH, BrokerAvailability, BrokerLocation, PermissionSignature, is_broker_process_name,
};
pub use self::dispatch::{
    LaunchCompletion, LaunchDispatcher, Offload, OffloadError, OffloadJob, ThreadOffload,
};
pub use self::flags::{
    BYPASS_BROKER_FLAG, DEBUG_FLAG, DIRECT_RUN_FLAG, LaunchFlags, broker_argument_string,
    recovery_arguments, relaunch_arguments,
};
pub use self::invoke::{BrokerInvoker, DirectInvoker, EpmBrokerInvoker, ShellDirectInvoker};
pub use self::outcome::{LaunchOutcome, classify_broker_failure};
pub use self::presenter::{Presenter, report_failure};
pub use self::routing::{RoutingDecision, RoutingMode, RoutingReason, RoutingState, decide};
pub use self::target::{BROKER_SENTINEL_NAME, LaunchTarget};
