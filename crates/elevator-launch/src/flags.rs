//! Launch flags recognised on the command line.
//!
//! Flags are matched case-insensitively, by presence only, and in any order.
//! Every other argument is left alone so it can be forwarded verbatim when the
//! launcher relaunches itself.

/// Forces direct routing; also the marker used by the recovery relaunch.
pub const DIRECT_RUN_FLAG: &str = "--direct-run";

/// Forces direct routing for one run; appended to every broker relaunch.
pub const BYPASS_BROKER_FLAG: &str = "--bypass-epm";

/// Requests the process identity report before startup.
pub const DEBUG_FLAG: &str = "--debug";

/// Flags parsed once from the process arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchFlags {
    /// `--direct-run` was present.
    pub direct_run: bool,
    /// `--bypass-epm` was present.
    pub bypass_broker: bool,
    /// `--debug` was present.
    pub debug: bool,
}

impl LaunchFlags {
    /// Parses flags from process arguments, excluding the program name.
    #[must_use]
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        let present = |flag: &str| args.iter().any(|arg| is_flag(arg.as_ref(), flag));
        Self {
            direct_run: present(DIRECT_RUN_FLAG),
            bypass_broker: present(BYPASS_BROKER_FLAG),
            debug: present(DEBUG_FLAG),
        }
    }
}

fn is_flag(argument: &str, flag: &str) -> bool {
    argument.eq_ignore_ascii_case(flag)
}

/// Rebuilds the argument list for a relaunch through the broker.
///
/// Every existing bypass marker is removed and exactly one is appended, so
/// the relaunched instance always routes directly.
#[must_use]
pub fn relaunch_arguments<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    with_single_marker(args, BYPASS_BROKER_FLAG)
}

/// Rebuilds the argument list for the recovery relaunch after a failed
/// startup.
///
/// Configuration flags and every other argument are kept in order; the
/// direct-run marker appears exactly once, at the end.
#[must_use]
pub fn recovery_arguments<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    with_single_marker(args, DIRECT_RUN_FLAG)
}

fn with_single_marker<S: AsRef<str>>(args: &[S], marker: &str) -> Vec<String> {
    args.iter()
        .map(AsRef::as_ref)
        .filter(|arg| !is_flag(arg, marker))
        .chain(std::iter::once(marker))
        .map(str::to_owned)
        .collect()
}

/// Joins arguments into the single string handed to the broker.
///
/// Each argument is wrapped in double quotes and the results are separated
/// by single spaces.
#[must_use]
pub fn broker_argument_string<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| format!("\"{}\"", arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
