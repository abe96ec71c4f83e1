//! Process-level routing: launch the interactive application directly, or
//! relaunch this executable through the broker first.
//!
//! [`decide`] applies a fixed priority table. Explicit flags beat anything
//! inferred from the environment, and an ancestry that cannot be determined
//! resolves toward the broker: an unknowable parent is not evidence that the
//! broker already ran. [`RoutingState`] makes the decision one-shot for the
//! lifetime of the process.

use std::fmt;

use tracing::debug;

use crate::ancestry::ProcessTable;
use crate::broker::{BrokerAvailability, is_broker_process_name};
use crate::flags::LaunchFlags;

/// Tracing target for routing decisions.
const ROUTING_TARGET: &str = "elevator_launch::routing";

/// Routing state of the current process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoutingMode {
    /// No decision has been taken yet.
    #[default]
    Unresolved,
    /// Run the interactive application in this process.
    Direct,
    /// Relaunch this executable through the broker and exit.
    ThroughBroker,
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => formatter.write_str("unresolved"),
            Self::Direct => formatter.write_str("direct"),
            Self::ThroughBroker => formatter.write_str("through-broker"),
        }
    }
}

/// Rule of the priority table that produced a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingReason {
    /// `--direct-run` was present.
    DirectRunFlag,
    /// `--bypass-epm` was present.
    BypassFlag,
    /// The broker is not installed.
    BrokerAbsent,
    /// The parent process could not be resolved.
    AncestryUnknown,
    /// The parent process was resolved but could not be described.
    ParentUnidentified {
        /// Parent process identifier.
        parent_pid: u32,
    },
    /// The parent process is the broker.
    LaunchedByBroker {
        /// Image name of the parent process.
        parent: String,
    },
    /// The parent process is something other than the broker.
    NotLaunchedByBroker {
        /// Image name of the parent process.
        parent: String,
    },
}

impl fmt::Display for RoutingReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectRunFlag => formatter.write_str("--direct-run requested"),
            Self::BypassFlag => formatter.write_str("--bypass-epm requested"),
            Self::BrokerAbsent => formatter.write_str("EPM client not installed"),
            Self::AncestryUnknown => formatter.write_str("parent process unknown"),
            Self::ParentUnidentified { parent_pid } => {
                write!(formatter, "parent process {parent_pid} could not be inspected")
            }
            Self::LaunchedByBroker { parent } => {
                write!(formatter, "already launched by EPM client ({parent})")
            }
            Self::NotLaunchedByBroker { parent } => {
                write!(formatter, "launched by {parent}")
            }
        }
    }
}

/// Outcome of [`decide`]: the terminal mode and the rule that chose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    /// Chosen routing mode; never [`RoutingMode::Unresolved`].
    pub mode: RoutingMode,
    /// Rule that produced the mode.
    pub reason: RoutingReason,
}

impl RoutingDecision {
    const fn direct(reason: RoutingReason) -> Self {
        Self {
            mode: RoutingMode::Direct,
            reason,
        }
    }

    const fn through_broker(reason: RoutingReason) -> Self {
        Self {
            mode: RoutingMode::ThroughBroker,
            reason,
        }
    }
}

/// Decides how this process should proceed.
///
/// Collaborators are consulted lazily in priority order, so no ancestry query
/// runs when a flag or the broker's absence already decides the outcome. The
/// function holds no state: identical inputs give identical decisions.
#[must_use]
pub fn decide<B, P>(flags: LaunchFlags, broker: &B, processes: &P) -> RoutingDecision
where
    B: BrokerAvailability + ?Sized,
    P: ProcessTable + ?Sized,
{
    let decision = evaluate(flags, broker, processes);
    debug!(
        target: ROUTING_TARGET,
        mode = %decision.mode,
        reason = %decision.reason,
        "routing decided"
    );
    decision
}

fn evaluate<B, P>(flags: LaunchFlags, broker: &B, processes: &P) -> RoutingDecision
where
    B: BrokerAvailability + ?Sized,
    P: ProcessTable + ?Sized,
{
    if flags.direct_run {
        return RoutingDecision::direct(RoutingReason::DirectRunFlag);
    }
    if flags.bypass_broker {
        return RoutingDecision::direct(RoutingReason::BypassFlag);
    }
    if !broker.is_broker_present() {
        return RoutingDecision::direct(RoutingReason::BrokerAbsent);
    }

    let Some(parent_pid) = processes.resolve_parent(processes.current_pid()) else {
        return RoutingDecision::through_broker(RoutingReason::AncestryUnknown);
    };
    let Some(parent) = processes.identity(parent_pid) else {
        return RoutingDecision::through_broker(RoutingReason::ParentUnidentified { parent_pid });
    };

    let parent_name = parent.image_name().to_owned();
    if is_broker_process_name(&parent_name) {
        RoutingDecision::direct(RoutingReason::LaunchedByBroker {
            parent: parent_name,
        })
    } else {
        RoutingDecision::through_broker(RoutingReason::NotLaunchedByBroker {
            parent: parent_name,
        })
    }
}

/// One-shot holder of the process routing decision.
///
/// The state starts [`RoutingMode::Unresolved`]; the first call to
/// [`RoutingState::resolve`] stores a terminal decision and every later call
/// returns it without evaluating anything again.
#[derive(Debug, Clone, Default)]
pub struct RoutingState {
    decision: Option<RoutingDecision>,
}

impl RoutingState {
    /// Creates an unresolved state.
    #[must_use]
    pub const fn new() -> Self {
        Self { decision: None }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> RoutingMode {
        self.decision
            .as_ref()
            .map_or(RoutingMode::Unresolved, |decision| decision.mode)
    }

    /// Stored decision, if resolved.
    #[must_use]
    pub const fn decision(&self) -> Option<&RoutingDecision> {
        self.decision.as_ref()
    }

    /// Resolves the state with `decide_once` unless already resolved.
    pub fn resolve<F>(&mut self, decide_once: F) -> &RoutingDecision
    where
        F: FnOnce() -> RoutingDecision,
    {
        self.decision.get_or_insert_with(decide_once)
    }
}
