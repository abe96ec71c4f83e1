//! Unit tests for ancestry parsing and the system process table.

use std::path::PathBuf;

use rstest::rstest;

use super::*;

#[rstest]
#[case("ParentProcessId  \r\r\n4312         \r\r\n\r\r\n", Some(4312))]
#[case("  PPID\n    1\n", Some(1))]
#[case("PPID\n\n\n  77 extra tokens\n", Some(77))]
#[case("", None)]
#[case("   \n\n", None)]
#[case("ParentProcessId\n", None)]
#[case("ParentProcessId\nabc\n", None)]
#[case("ParentProcessId\n-12\n", None)]
#[case("ParentProcessId\n0\n", None)]
#[case("ParentProcessId\n99999999999\n", None)]
fn parses_parent_identifier(#[case] output: &str, #[case] expected: Option<u32>) {
    assert_eq!(parse_query_output(output), expected);
}

#[test]
fn value_line_keeps_paths_with_spaces() {
    let output = "ExecutablePath\r\nC:\\Program Files\\Tool\\tool.exe   \r\n";
    assert_eq!(
        parse_query_value(output).as_deref(),
        Some("C:\\Program Files\\Tool\\tool.exe")
    );
}

#[test]
fn image_name_prefers_executable_file_name() {
    let identity = ProcessIdentity {
        pid: 10,
        name: String::from("stub"),
        executable_path: Some(PathBuf::from("/opt/epm/EpmClientStub.exe")),
        parent_pid: None,
    };
    assert_eq!(identity.image_name(), "EpmClientStub.exe");

    let bare = ProcessIdentity {
        executable_path: None,
        ..identity
    };
    assert_eq!(bare.image_name(), "stub");
}

#[cfg(unix)]
#[test]
fn system_table_agrees_with_the_kernel_when_ps_is_available() {
    let table = SystemProcessTable::new();
    let pid = table.current_pid();
    // Minimal containers may lack `ps`; an unknown parent is a valid answer.
    if let Some(parent) = table.resolve_parent(pid) {
        assert_eq!(parent, std::os::unix::process::parent_id());
    }
}

#[test]
fn system_table_reports_unknown_for_dead_processes() {
    let table = SystemProcessTable::new();
    assert_eq!(table.resolve_parent(u32::MAX), None);
    assert!(table.identity(u32::MAX).is_none());
}
