//! CLI entrypoint for the Elevator application launcher.
//!
//! The binary delegates to [`elevator_cli::run`], which loads configuration,
//! installs telemetry, decides whether to relaunch through the EPM client and
//! otherwise runs the interactive console.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    elevator_cli::run(std::env::args_os(), &mut io::stderr())
}
