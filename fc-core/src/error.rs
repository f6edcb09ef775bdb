//! Error types for pi-fanctl core
//!
//! Re-exports the unified error type from fc-error crate.

pub use fc_error::{FanctlError, Result};
