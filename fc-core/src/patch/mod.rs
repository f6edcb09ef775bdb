//! Idempotent patches of shared system files
//!
//! - `boot` - overlay directive block in the boot settings file
//! - `board_dts` - stock fan binding scrub in the board device tree

mod board_dts;
mod boot;

pub use board_dts::{update_board_dts, NodeScrubber, NodeState};
pub use boot::{add_directive_block, remove_directive_block, DirectiveBlock};
