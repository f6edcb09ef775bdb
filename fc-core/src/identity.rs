//! Board identity
//!
//! The firmware exposes the root `compatible` property as a NUL-separated
//! list, e.g. `raspberrypi,5-model-b\0brcm,bcm2712\0`. With the NULs dropped
//! and the text split on `,`, the second field starts with the board revision
//! and the third field is the SoC name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::constants::{board, paths};
use crate::error::{FanctlError, Result};

/// Board revision and SoC name of the running host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostIdentity {
    pub board_id: u32,
    pub soc_name: String,
}

impl HostIdentity {
    pub fn new(board_id: u32, soc_name: impl Into<String>) -> Self {
        Self {
            board_id,
            soc_name: soc_name.into(),
        }
    }

    pub fn is_rpi_5(&self) -> bool {
        self.board_id == board::RPI_5
    }
}

/// Anything that can tell which board we are running on
pub trait IdentitySource {
    fn read_identity(&self) -> Result<HostIdentity>;
}

/// Reads the identity from the firmware device tree (or a copy of it)
#[derive(Debug, Clone)]
pub struct FirmwareIdentity {
    path: PathBuf,
}

impl FirmwareIdentity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FirmwareIdentity {
    fn default() -> Self {
        Self::new(paths::BOARD_INFO_SOURCE)
    }
}

impl IdentitySource for FirmwareIdentity {
    fn read_identity(&self) -> Result<HostIdentity> {
        let raw = fs::read(&self.path).map_err(|e| FanctlError::read(&self.path, e))?;
        let text = String::from_utf8_lossy(&raw);
        let first_line = text.lines().next().unwrap_or_default();
        let identity = parse_identity(first_line)?;
        debug!(
            "Board identity from {:?}: board {} soc {}",
            self.path, identity.board_id, identity.soc_name
        );
        Ok(identity)
    }
}

/// Parse a `compatible` line into a [`HostIdentity`]
pub fn parse_identity(line: &str) -> Result<HostIdentity> {
    let cleaned = line.replace('\0', "");
    let fields: Vec<&str> = cleaned.trim().split(',').collect();
    if fields.len() < 3 {
        return Err(FanctlError::InvalidIdentity(format!(
            "expected at least 3 comma-separated fields in '{}'",
            cleaned.trim()
        )));
    }

    let revision = fields[1].split('-').next().unwrap_or_default();
    let board_id = revision.parse::<u32>().map_err(|_| {
        FanctlError::InvalidIdentity(format!("board revision '{}' is not a number", revision))
    })?;

    let soc_name = fields[2].trim();
    if soc_name.is_empty() {
        return Err(FanctlError::InvalidIdentity("empty SoC name".to_string()));
    }

    Ok(HostIdentity::new(board_id, soc_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_pi5_compatible() {
        let identity = parse_identity("raspberrypi,5-model-b\0brcm,bcm2712\0").unwrap();
        assert_eq!(identity, HostIdentity::new(5, "bcm2712"));
        assert!(identity.is_rpi_5());
    }

    #[test]
    fn test_parse_pi4_compatible() {
        let identity = parse_identity("raspberrypi,4-model-b\0brcm,bcm2711\0").unwrap();
        assert_eq!(identity.board_id, 4);
        assert_eq!(identity.soc_name, "bcm2711");
        assert!(!identity.is_rpi_5());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_identity("").is_err());
        assert!(parse_identity("vendor,board").is_err());
        assert!(parse_identity("raspberrypi,model-b\0brcm,bcm2711").is_err());
    }

    #[test]
    fn test_firmware_identity_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"raspberrypi,3-model-b-plus\0brcm,bcm2837\0").unwrap();

        let identity = FirmwareIdentity::new(file.path()).read_identity().unwrap();
        assert_eq!(identity, HostIdentity::new(3, "bcm2837"));
    }

    #[test]
    fn test_firmware_identity_missing_file() {
        let source = FirmwareIdentity::new("/nonexistent/compatible");
        assert!(matches!(
            source.read_identity(),
            Err(FanctlError::FileNotFound(_))
        ));
    }
}
