//! Platform process start used by [`super::ShellDirectInvoker`].

#[cfg(not(windows))]
use std::io;
#[cfg(windows)]
use std::process::Output;
use std::process::{Command, Stdio};
#[cfg(not(windows))]
use std::process::{Child, ExitStatus};
#[cfg(not(windows))]
use std::thread::{self, JoinHandle};

#[cfg(not(windows))]
use tracing::{debug, warn};

use crate::target::LaunchTarget;

#[cfg(not(windows))]
const SHELL_TARGET: &str = "elevator_launch::invoke::shell";

/// Starts `target`, returning the failure text on error.
pub(super) fn start(target: &LaunchTarget) -> Result<(), String> {
    let mut command = start_command(target);
    command.stdin(Stdio::null());
    run(command)
}

/// Quotes `value` as a PowerShell single-quoted string literal.
#[cfg(any(windows, test))]
pub(super) fn powershell_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Builds the `Start-Process` script for `target`.
#[cfg(any(windows, test))]
pub(super) fn start_process_script(target: &LaunchTarget) -> String {
    let path = target.path().to_string_lossy();
    let mut script = format!("Start-Process -FilePath {}", powershell_literal(&path));
    if target.request_elevation() {
        script.push_str(" -Verb RunAs");
    }
    script
}

#[cfg(windows)]
fn start_command(target: &LaunchTarget) -> Command {
    let mut command = Command::new("powershell");
    command
        .arg("-NoProfile")
        .arg("-NonInteractive")
        .arg("-Command")
        .arg(start_process_script(target));
    command
}

#[cfg(windows)]
fn run(mut command: Command) -> Result<(), String> {
    let output = command
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|error| error.to_string())?;
    check_output(&output)
}

#[cfg(not(windows))]
fn start_command(target: &LaunchTarget) -> Command {
    if target.request_elevation() {
        let mut command = Command::new("pkexec");
        command.arg(target.path());
        command
    } else {
        Command::new(target.path())
    }
}

#[cfg(not(windows))]
fn run(mut command: Command) -> Result<(), String> {
    // Only the spawn is checked; the exit status is collected off-thread.
    let child = command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|error| error.to_string())?;
    let pid = child.id();
    if let Err(error) = reap_in_background(child) {
        warn!(target: SHELL_TARGET, pid, error = %error, "cannot reap started process");
    }
    Ok(())
}

/// Name of the threads waiting on directly started processes.
#[cfg(not(windows))]
pub(super) const REAPER_THREAD_NAME: &str = "elevator-reaper";

/// Waits for `child` on its own thread so it never lingers as a zombie.
#[cfg(not(windows))]
pub(super) fn reap_in_background(
    mut child: Child,
) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    thread::Builder::new()
        .name(REAPER_THREAD_NAME.to_owned())
        .spawn(move || {
            let status = child.wait();
            debug!(target: SHELL_TARGET, pid = child.id(), ?status, "started process exited");
            status
        })
}

#[cfg(windows)]
fn check_output(output: &Output) -> Result<(), String> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = stderr.trim();
    if message.is_empty() {
        Err(format!(
            "process start exited with status {:?}",
            output.status.code()
        ))
    } else {
        Err(message.to_owned())
    }
}
