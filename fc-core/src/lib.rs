//! pi-fanctl Core Library
//!
//! Configuration and build artifacts for the Raspberry Pi fan control driver.
//!
//! # Module Structure
//!
//! - `data/` - Curve data model, validation policy, config parser, build flags
//! - `engine/` - Device-tree template compiler and overlay generation
//! - `patch/` - Boot settings and board device-tree patchers
//! - `identity` - Board revision and SoC name of the host
//!
//! # Example
//!
//! ```no_run
//! use fc_core::{load_config, FirmwareIdentity, IdentitySource, ValidationPolicy};
//!
//! let identity = FirmwareIdentity::default().read_identity().unwrap();
//! let config = load_config(
//!     std::path::Path::new("/etc/fanctl.conf"),
//!     &identity,
//!     ValidationPolicy::strict(),
//! )
//! .unwrap();
//! println!("{}", fc_core::build_flags_line(&config));
//! ```

// Grouped modules
pub mod data;
pub mod engine;
pub mod patch;

// Standalone modules
pub mod constants;
pub mod error;
pub mod files;
pub mod identity;

// Re-export data types and validation
pub use data::{
    build_flags, build_flags_line, load_config, parse_config, pwm_period_from_frequency,
    CurveConfig, CurveConfigValidator, CurveFamily, CurvePoint, FieldValue,
    HysteresisOrdering, Mode, PwmPolarity, RangeHandling, SpeedOrdering, ValidationPolicy,
};

// Re-export error types
pub use error::{FanctlError, Result};

// Re-export engine types
pub use engine::{generate_overlay, OverlayRequest, TemplateCompiler};

// Re-export patchers
pub use patch::{
    add_directive_block, remove_directive_block, update_board_dts, DirectiveBlock,
    NodeScrubber,
};

// Re-export identity
pub use identity::{parse_identity, FirmwareIdentity, HostIdentity, IdentitySource};
