//! Process identity report shown when `--debug` is passed.

use std::path::Path;

use elevator_launch::{BrokerAvailability, ProcessTable, RoutingDecision};

const UNKNOWN: &str = "Unknown";

/// Renders the identity of this process and its parent.
pub(crate) fn identity_report<T, B>(processes: &T, broker: &B, routing: &RoutingDecision) -> String
where
    T: ProcessTable + ?Sized,
    B: BrokerAvailability + ?Sized,
{
    let pid = processes.current_pid();
    let current = processes.identity(pid);
    let mut lines = vec![
        format!("Process ID: {pid}"),
        format!(
            "Process Name: {}",
            current.as_ref().map_or(UNKNOWN, |identity| identity.name.as_str())
        ),
        format!(
            "Process Path: {}",
            display_path(current.as_ref().and_then(|identity| identity.executable_path.as_deref()))
        ),
    ];

    match processes.resolve_parent(pid) {
        Some(parent_pid) => {
            lines.push(format!("Parent Process ID: {parent_pid}"));
            match processes.identity(parent_pid) {
                Some(parent) => {
                    lines.push(format!("Parent Name: {}", parent.name));
                    lines.push(format!(
                        "Parent Path: {}",
                        display_path(parent.executable_path.as_deref())
                    ));
                }
                None => lines.push("Parent process information unavailable".to_owned()),
            }
        }
        None => lines.push("Could not determine parent process".to_owned()),
    }

    lines.push(format!("EPM Client Path exists: {}", broker.is_broker_present()));
    lines.push(format!("Launch route: {} ({})", routing.mode, routing.reason));
    lines.join("\n")
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or_else(|| UNKNOWN.to_owned(), |path| path.display().to_string())
}
