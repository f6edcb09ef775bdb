//! Whole-file read and atomic publish helpers
//!
//! Every file this crate changes is read completely, rewritten in memory and
//! then published through a sibling temp file and a rename, so a failure
//! never leaves a half-written target behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{FanctlError, Result};

/// Read a whole text file
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| FanctlError::read(path, e))
}

/// Read a whole text file, `None` if it does not exist
pub fn read_text_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FanctlError::read(path, e)),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{}.fanctl-tmp", name))
}

/// Replace `path` with `contents` in one step
pub fn publish_atomically(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| FanctlError::write(parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let result = write_temp(&temp_path, path, contents).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| FanctlError::write(path, e))
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    } else {
        debug!("Published {} bytes to {:?}", contents.len(), path);
    }
    result
}

fn write_temp(temp_path: &Path, target: &Path, contents: &str) -> Result<()> {
    let mut file =
        fs::File::create(temp_path).map_err(|e| FanctlError::write(temp_path, e))?;

    file.write_all(contents.as_bytes())
        .map_err(|e| FanctlError::write(temp_path, e))?;

    file.sync_all()
        .map_err(|e| FanctlError::write(temp_path, e))?;

    drop(file);

    // Keep the mode of the file being replaced
    if let Ok(metadata) = fs::metadata(target) {
        fs::set_permissions(temp_path, metadata.permissions())
            .map_err(|e| FanctlError::write(temp_path, e))?;
    }
    Ok(())
}
