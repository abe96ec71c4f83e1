//! Structured results of launch attempts.

use std::fmt;

use crate::broker::PermissionSignature;

/// Result of a broker or direct invocation.
///
/// Invokers never return errors; every failure is one of these variants so
/// the dispatcher can pick a fallback by matching rather than by inspecting
/// error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The process was started.
    Success,
    /// The broker executable is not installed at its fixed location.
    BrokerUnavailable,
    /// The requested target does not exist.
    TargetMissing,
    /// The broker refused the launch with its permission failure signature.
    BrokerPermissionDenied,
    /// The broker failed for any other reason.
    BrokerOtherFailure(String),
    /// A direct start failed.
    DirectFailure(String),
}

impl LaunchOutcome {
    /// Whether the outcome reports a started process.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for LaunchOutcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => formatter.write_str("started"),
            Self::BrokerUnavailable => formatter.write_str("EPM client is not installed"),
            Self::TargetMissing => formatter.write_str("target executable was not found"),
            Self::BrokerPermissionDenied => {
                formatter.write_str("EPM client error (0x8000FFFF): permission denied")
            }
            Self::BrokerOtherFailure(message) => {
                write!(formatter, "EPM client failed: {message}")
            }
            Self::DirectFailure(message) => write!(formatter, "failed to launch: {message}"),
        }
    }
}

/// Classifies a broker failure from its error text and raw OS code.
///
/// The broker offers no structured error channel, so the permission variant is
/// constructed by matching its documented signature.
#[must_use]
pub fn classify_broker_failure(message: &str, raw_code: Option<i32>) -> LaunchOutcome {
    if PermissionSignature::matches(message, raw_code) {
        LaunchOutcome::BrokerPermissionDenied
    } else {
        LaunchOutcome::BrokerOtherFailure(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Catastrophic failure (0x8000FFFF)", None)]
    #[case("error code 0x8000ffff", None)]
    #[case("exit status -2147418113", None)]
    #[case("spawn failed", Some(-2_147_418_113))]
    fn permission_signature_yields_permission_variant(
        #[case] message: &str,
        #[case] raw_code: Option<i32>,
    ) {
        assert_eq!(
            classify_broker_failure(message, raw_code),
            LaunchOutcome::BrokerPermissionDenied
        );
    }

    #[rstest]
    #[case("The system cannot find the file specified. (os error 2)", Some(2))]
    #[case("Access is denied. (os error 5)", Some(5))]
    #[case("0x8000FFF", None)]
    fn other_errors_stay_unclassified(#[case] message: &str, #[case] raw_code: Option<i32>) {
        assert_eq!(
            classify_broker_failure(message, raw_code),
            LaunchOutcome::BrokerOtherFailure(message.to_owned())
        );
    }

    #[test]
    fn only_success_reports_success() {
        assert!(LaunchOutcome::Success.is_success());
        assert!(!LaunchOutcome::TargetMissing.is_success());
        assert!(!LaunchOutcome::DirectFailure(String::from("boom")).is_success());
    }
}
