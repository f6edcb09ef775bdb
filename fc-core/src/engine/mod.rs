//! Overlay compilation engine
//!
//! Contains the conditional block scanner, the template compiler and the
//! overlay generation entry point.

pub mod blocks;
mod overlay;
mod template;

pub use blocks::{BlockScanner, BlockState, LineAction, Marker};
pub use overlay::{generate_overlay, OverlayRequest};
pub use template::{TemplateCompiler, DEFAULT_LIST_SEPARATOR};
