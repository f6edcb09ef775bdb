//! Board device-tree scrub
//!
//! The stock Raspberry Pi 5 device tree binds the fan header PWM to its own
//! `cooling_fan` node. Driving the header ourselves means taking the
//! `compatible` and `pwms` properties out of that node; everything else in the
//! file is left alone.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::constants::markers;
use crate::data::CurveConfig;
use crate::error::Result;
use crate::files;
use crate::patch::boot::collapse_whitespace;

/// Scrubber state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Before (or after) the target node
    Outside,
    /// Node name seen, opening brace not yet
    Found,
    /// Inside the node body
    InNode,
}

/// Removes fixed property lines from the first block of a named node
#[derive(Debug, Clone)]
pub struct NodeScrubber<'a> {
    node_name: &'a str,
    properties: &'a [&'a str],
    state: NodeState,
}

impl<'a> NodeScrubber<'a> {
    pub fn new(node_name: &'a str, properties: &'a [&'a str]) -> Self {
        Self {
            node_name,
            properties,
            state: NodeState::Outside,
        }
    }

    /// Scrubber for the Raspberry Pi 5 `cooling_fan` node
    pub fn cooling_fan() -> NodeScrubber<'static> {
        NodeScrubber::new(markers::COOLING_FAN_NODE, &markers::COOLING_FAN_PROPERTIES)
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Advance over one line; false means the line is dropped
    pub fn keep(&mut self, line: &str) -> bool {
        let stripped = collapse_whitespace(line);

        if self.state == NodeState::Outside && stripped.contains(self.node_name) {
            self.state = NodeState::Found;
        }
        if self.state == NodeState::Outside {
            return true;
        }

        if stripped.contains('{') {
            self.state = NodeState::InNode;
        }
        if self.state == NodeState::InNode
            && self.properties.iter().any(|p| stripped.starts_with(p))
        {
            return false;
        }
        if stripped.contains('}') {
            self.state = NodeState::Outside;
        }
        true
    }

    /// Scrub a whole document, `None` if nothing was removed
    pub fn scrub(mut self, text: &str) -> Option<String> {
        let mut output = String::with_capacity(text.len());
        let mut removed = 0usize;
        for line in text.split_inclusive('\n') {
            if self.keep(line) {
                output.push_str(line);
            } else {
                removed += 1;
            }
        }
        debug!("Scrubbed {} line(s) from node '{}'", removed, self.node_name);
        (removed > 0).then_some(output)
    }
}

/// Remove the stock fan binding from the board DTS at `path`
///
/// Only applies to the Raspberry Pi 5. A missing file is not an error, since
/// not every image ships the board sources. Returns true if the file changed.
pub fn update_board_dts(config: &CurveConfig, path: &Path) -> Result<bool> {
    if !config.is_rpi_5() {
        debug!("Board {} has no fan header node to scrub", config.board_id());
        return Ok(false);
    }

    let Some(text) = files::read_text_if_exists(path)? else {
        warn!("Board DTS {:?} not found, nothing to scrub", path);
        return Ok(false);
    };

    match NodeScrubber::cooling_fan().scrub(&text) {
        Some(updated) => {
            files::publish_atomically(path, &updated)?;
            info!("Removed stock cooling_fan PWM binding from {:?}", path);
            Ok(true)
        }
        None => Ok(false),
    }
}
