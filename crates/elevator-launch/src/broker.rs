//! Location and identification of the EPM elevation broker.
//!
//! The broker is a third-party executable installed at a fixed path. Its
//! absence is not an error: routing degrades to direct launches. This module
//! also owns the two heuristics the launcher applies to the broker: spotting
//! it among process ancestors, and recognising its permission failure.

use std::path::{Path, PathBuf};

/// Fixed install location of the EPM client stub.
pub const BROKER_PATH: &str = r"C:\Program Files\Microsoft EPM Agent\EPMClient\EpmClientStub.exe";

/// Case-insensitive substrings identifying broker process names.
const BROKER_NAME_MARKERS: &[&str] = &["epm", "clientstub"];

/// Checks whether the broker is installed.
pub trait BrokerAvailability {
    /// Returns `true` when the broker executable exists right now.
    ///
    /// Implementations must not cache: the broker can be installed or removed
    /// between checks.
    fn is_broker_present(&self) -> bool;
}

/// Filesystem location of the broker executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerLocation {
    path: PathBuf,
}

impl BrokerLocation {
    /// The production broker location.
    #[must_use]
    pub fn system() -> Self {
        Self::new(BROKER_PATH)
    }

    /// A broker expected at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the broker executable.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BrokerAvailability for BrokerLocation {
    fn is_broker_present(&self) -> bool {
        self.path.is_file()
    }
}

/// Returns `true` when `name` looks like the broker executable.
///
/// Accepts bare names or full paths; only the final component is inspected.
#[must_use]
pub fn is_broker_process_name(name: &str) -> bool {
    let file_name = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .to_ascii_lowercase();
    BROKER_NAME_MARKERS
        .iter()
        .any(|marker| file_name.contains(marker))
}

/// The broker's documented permission failure, HRESULT `0x8000FFFF`.
#[derive(Debug, Clone, Copy)]
pub struct PermissionSignature;

impl PermissionSignature {
    /// Hexadecimal rendering of the HRESULT.
    pub const HEX: &'static str = "0x8000ffff";
    /// Signed decimal rendering of the HRESULT.
    pub const DECIMAL: &'static str = "-2147418113";
    /// The HRESULT reinterpreted as a signed OS error code.
    pub const CODE: i32 = -2_147_418_113;

    /// Returns `true` when the error text or raw code carries the signature.
    #[must_use]
    pub fn matches(message: &str, raw_code: Option<i32>) -> bool {
        raw_code == Some(Self::CODE)
            || message.contains(Self::DECIMAL)
            || message.to_ascii_lowercase().contains(Self::HEX)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn presence_follows_the_filesystem() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("EpmClientStub.exe");
        let location = BrokerLocation::new(&path);
        assert!(!location.is_broker_present());

        fs::write(&path, b"stub").expect("install broker");
        assert!(location.is_broker_present());

        fs::remove_file(&path).expect("remove broker");
        assert!(!location.is_broker_present());
    }

    #[test]
    fn directories_do_not_count_as_broker() {
        let temp = TempDir::new().expect("temp dir");
        assert!(!BrokerLocation::new(temp.path()).is_broker_present());
    }

    #[test]
    fn system_location_uses_fixed_path() {
        assert_eq!(BrokerLocation::system().path(), Path::new(BROKER_PATH));
    }

    #[rstest]
    #[case("EpmClientStub.exe", true)]
    #[case("EPMAgent.exe", true)]
    #[case("clientstub.exe", true)]
    #[case(r"C:\Program Files\Microsoft EPM Agent\EPMClient\EpmClientStub.exe", true)]
    #[case("explorer.exe", false)]
    #[case(r"C:\Epm\explorer.exe", false)]
    #[case("/usr/bin/bash", false)]
    fn broker_names(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_broker_process_name(name), expected);
    }
}
