//! Boot settings directive block
//!
//! Adds or removes the overlay load directive in the boot settings file:
//!
//! ```text
//!
//! [all]
//! dtoverlay=<driver>
//! ```
//!
//! Lines are compared with all whitespace removed. Removal also takes out the
//! header and blank line that insertion wrote, but only when they sit directly
//! above the directive. A file without a final line end keeps that shape: the
//! directive is then written unterminated, and removing an unterminated
//! directive strips the line end it leaves behind.

use std::collections::VecDeque;
use std::path::Path;

use tracing::{debug, info};

use crate::constants::markers;
use crate::error::Result;
use crate::files;

/// Lines of lookback the remover keeps
const LOOKBACK: usize = 2;

/// Header + directive pair managed in a settings file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveBlock {
    header: String,
    directive: String,
}

impl DirectiveBlock {
    pub fn new(header: impl Into<String>, directive: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            directive: directive.into(),
        }
    }

    /// `[all]` + `dtoverlay=<driver_name>`
    pub fn dtoverlay(driver_name: &str) -> Self {
        Self::new(
            markers::BOOT_SECTION_HEADER,
            format!("{}{}", markers::DTOVERLAY_PREFIX, driver_name),
        )
    }

    pub fn directive(&self) -> &str {
        &self.directive
    }

    pub fn is_directive(&self, line: &str) -> bool {
        collapse_whitespace(line) == self.directive
    }

    fn is_header(&self, line: &str) -> bool {
        line.trim() == self.header
    }

    pub fn is_present(&self, text: &str) -> bool {
        text.lines().any(|line| self.is_directive(line))
    }

    /// Text with the block appended, `None` if the directive is already there
    pub fn insert(&self, text: &str) -> Option<String> {
        if self.is_present(text) {
            return None;
        }
        let unterminated = !text.is_empty() && !text.ends_with('\n');
        let mut output =
            String::with_capacity(text.len() + self.header.len() + self.directive.len() + 4);
        output.push_str(text);
        if unterminated {
            output.push('\n');
        }
        output.push('\n');
        output.push_str(&self.header);
        output.push('\n');
        output.push_str(&self.directive);
        if !unterminated {
            output.push('\n');
        }
        Some(output)
    }

    /// Text without the directive (and its header pair), `None` if absent
    pub fn remove(&self, text: &str) -> Option<String> {
        let mut output = String::with_capacity(text.len());
        let mut lookback: VecDeque<&str> = VecDeque::with_capacity(LOOKBACK + 1);
        let mut found = false;
        let mut unterminated = false;

        for line in text.split_inclusive('\n') {
            if self.is_directive(line) {
                found = true;
                unterminated = !line.ends_with('\n');
                if lookback.back().is_some_and(|l| self.is_header(l)) {
                    lookback.pop_back();
                    if lookback.back().is_some_and(|l| l.trim().is_empty()) {
                        lookback.pop_back();
                    }
                }
                continue;
            }
            lookback.push_back(line);
            if lookback.len() > LOOKBACK {
                if let Some(oldest) = lookback.pop_front() {
                    output.push_str(oldest);
                }
            }
        }

        if !found {
            return None;
        }
        lookback.iter().for_each(|line| output.push_str(line));
        if unterminated && output.ends_with('\n') {
            output.pop();
        }
        Some(output)
    }
}

/// Strip every whitespace character
pub(crate) fn collapse_whitespace(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Ensure the block is present in the file at `path`; true if the file changed
pub fn add_directive_block(path: &Path, block: &DirectiveBlock) -> Result<bool> {
    let text = files::read_text(path)?;
    match block.insert(&text) {
        Some(updated) => {
            files::publish_atomically(path, &updated)?;
            info!("Added '{}' to {:?}", block.directive(), path);
            Ok(true)
        }
        None => {
            debug!("'{}' already present in {:?}", block.directive(), path);
            Ok(false)
        }
    }
}

/// Ensure the block is absent from the file at `path`; true if the file changed
pub fn remove_directive_block(path: &Path, block: &DirectiveBlock) -> Result<bool> {
    let text = files::read_text(path)?;
    match block.remove(&text) {
        Some(updated) => {
            files::publish_atomically(path, &updated)?;
            info!("Removed '{}' from {:?}", block.directive(), path);
            Ok(true)
        }
        None => {
            debug!("'{}' not present in {:?}", block.directive(), path);
            Ok(false)
        }
    }
}
