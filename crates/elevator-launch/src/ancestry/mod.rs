//! Process ancestry lookups.
//!
//! Ancestry is resolved by shelling out to the platform's process query tool
//! (`wmic` on Windows, `ps` elsewhere). Both print a header line followed by
//! a value line. The query is fragile by nature, so every failure collapses
//! into "unknown" (`None`) and callers pick their cautious branch instead of
//! handling errors.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Tracing target for ancestry lookups.
const ANCESTRY_TARGET: &str = "elevator_launch::ancestry";

/// Identity of a live process. Produced on demand and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    /// Process identifier.
    pub pid: u32,
    /// Short process name, for example `EpmClientStub.exe`.
    pub name: String,
    /// Full executable path when the platform reports one.
    pub executable_path: Option<PathBuf>,
    /// Parent process identifier when it could be resolved.
    pub parent_pid: Option<u32>,
}

impl ProcessIdentity {
    /// Name used for broker identification: the executable file name when
    /// known, otherwise the reported process name.
    #[must_use]
    pub fn image_name(&self) -> &str {
        self.executable_path
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .unwrap_or(&self.name)
    }
}

/// Narrow view of the operating system's process table.
pub trait ProcessTable {
    /// Resolves the parent of `pid`, or `None` when it cannot be determined.
    ///
    /// Implementations must not panic and must not surface errors.
    fn resolve_parent(&self, pid: u32) -> Option<u32>;

    /// Describes the live process `pid`, or `None` when it is unavailable.
    fn identity(&self, pid: u32) -> Option<ProcessIdentity>;

    /// Identifier of the calling process.
    fn current_pid(&self) -> u32 {
        std::process::id()
    }
}

/// [`ProcessTable`] backed by the platform process query tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessTable;

impl SystemProcessTable {
    /// Builds the system process table.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessTable for SystemProcessTable {
    fn resolve_parent(&self, pid: u32) -> Option<u32> {
        match run_query(pid, QueryField::ParentPid) {
            Ok(output) => parse_query_output(&output),
            Err(error) => {
                debug!(
                    target: ANCESTRY_TARGET,
                    pid,
                    error = %error,
                    "parent process query failed"
                );
                None
            }
        }
    }

    fn identity(&self, pid: u32) -> Option<ProcessIdentity> {
        let image = match run_query(pid, QueryField::Image) {
            Ok(output) => parse_query_value(&output)?,
            Err(error) => {
                debug!(
                    target: ANCESTRY_TARGET,
                    pid,
                    error = %error,
                    "process image query failed"
                );
                return None;
            }
        };
        let path = PathBuf::from(&image);
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or_else(|| image.clone(), str::to_owned);
        let executable_path = path.is_absolute().then_some(path);
        Some(ProcessIdentity {
            pid,
            name,
            executable_path,
            parent_pid: self.resolve_parent(pid),
        })
    }
}

/// Parses a parent identifier from process query output.
///
/// Blank lines are ignored. The output must then hold a header line and a
/// value line whose first whitespace-delimited token is a positive integer;
/// any other shape yields `None`.
#[must_use]
pub fn parse_query_output(output: &str) -> Option<u32> {
    let value_line = value_line(output)?;
    let token = value_line.split_whitespace().next()?;
    token.parse::<u32>().ok().filter(|pid| *pid > 0)
}

/// Extracts the trimmed value line from process query output.
fn parse_query_value(output: &str) -> Option<String> {
    value_line(output).map(str::to_owned)
}

fn value_line(output: &str) -> Option<&str> {
    let mut lines = output.lines().map(str::trim).filter(|line| !line.is_empty());
    let _header = lines.next()?;
    lines.next()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryField {
    ParentPid,
    Image,
}

#[derive(Debug, Error)]
enum QueryError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with status {status:?}")]
    Status {
        program: &'static str,
        status: Option<i32>,
    },
}

#[cfg(windows)]
fn query_command(pid: u32, field: QueryField) -> (&'static str, Command) {
    let column = match field {
        QueryField::ParentPid => "ParentProcessId",
        QueryField::Image => "ExecutablePath",
    };
    let mut command = Command::new("wmic");
    command
        .arg("process")
        .arg("where")
        .arg(format!("ProcessId={pid}"))
        .arg("get")
        .arg(column);
    ("wmic", command)
}

#[cfg(not(windows))]
fn query_command(pid: u32, field: QueryField) -> (&'static str, Command) {
    let column = match field {
        QueryField::ParentPid => "ppid",
        QueryField::Image => "comm",
    };
    let mut command = Command::new("ps");
    command.arg("-o").arg(column).arg("-p").arg(pid.to_string());
    ("ps", command)
}

fn run_query(pid: u32, field: QueryField) -> Result<String, QueryError> {
    let (program, mut command) = query_command(pid, field);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    let output = command
        .output()
        .map_err(|source| QueryError::Spawn { program, source })?;
    if !output.status.success() {
        return Err(QueryError::Status {
            program,
            status: output.status.code(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests;
