//! Unified error handling for pi-fanctl
//!
//! Every failure the configuration tool can hit is a variant of [`FanctlError`].
//! There is no degraded mode: callers propagate the error up to `main`, which
//! prints it and exits non-zero.

use std::io;
use std::path::PathBuf;

/// Result type alias using FanctlError
pub type Result<T> = std::result::Result<T, FanctlError>;

/// Unified error type for all pi-fanctl operations
#[derive(thiserror::Error, Debug)]
pub enum FanctlError {
    // ============================================================================
    // Malformed Input
    // ============================================================================
    #[error("Invalid line {line} in config: {content}")]
    InvalidLine {
        line: usize,
        content: String,
    },

    #[error("Curve point {index} defined more than once")]
    DuplicatePoint {
        index: usize,
    },

    // ============================================================================
    // Constraint Violations
    // ============================================================================
    #[error("Value {value} for {field} is out of range ({min}..={max})")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Invalid data for curve point {index}: {reason}")]
    InvalidPoint {
        index: usize,
        reason: String,
    },

    // ============================================================================
    // Unsupported Combinations
    // ============================================================================
    #[error("Mode '{mode}' is not available on board {board_id} (Raspberry Pi 5 only)")]
    UnsupportedMode {
        mode: String,
        board_id: u32,
    },

    // ============================================================================
    // Missing or Undefined References
    // ============================================================================
    #[error("No fan curve provided")]
    NoCurve,

    #[error("Missing point(s) {0} for fan curve")]
    MissingPoints(String),

    #[error("Undefined placeholder ${name} at template line {line}")]
    UndefinedPlaceholder {
        name: String,
        line: usize,
    },

    #[error("Unreadable board identity: {0}")]
    InvalidIdentity(String),

    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Generic(String),
}

impl FanctlError {
    /// Create a generic error from a string
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid-line error for a 1-based line number
    pub fn invalid_line(line: usize, content: impl Into<String>) -> Self {
        Self::InvalidLine {
            line,
            content: content.into(),
        }
    }

    /// Create an invalid-point error for a 1-based point index
    pub fn invalid_point(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidPoint {
            index,
            reason: reason.into(),
        }
    }

    /// Map an I/O error on `path` to the read variant, keeping "not found" distinct
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::FileRead { path, source }
        }
    }

    /// Map an I/O error on `path` to the write variant
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }
}

impl From<String> for FanctlError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

impl From<&str> for FanctlError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}
