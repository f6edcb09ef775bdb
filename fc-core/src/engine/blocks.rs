//! Board-conditional block scanner
//!
//! A template line carrying a board tag that does not name the current board
//! starts a skipped block. The block runs until its braces balance again; the
//! first `{` arms the counter, so stray `}` before it are ignored. A single
//! blank line right after a skipped block is swallowed as well.

/// What the board tags of a line say about the current board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// No board tag on the line
    None,
    /// Tagged, and one tag names the current board
    Matching,
    /// Tagged for other boards only
    Foreign,
}

/// Scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Copying,
    Skipping {
        /// Unclosed `{` inside the skipped block
        depth: usize,
        /// Whether the block's first `{` has been seen
        opened: bool,
    },
    /// The previous line closed a skipped block
    AfterBlock,
}

/// Verdict for one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    Emit,
    Drop,
}

#[derive(Debug, Clone)]
pub struct BlockScanner {
    state: BlockState,
}

impl Default for BlockScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockScanner {
    pub fn new() -> Self {
        Self {
            state: BlockState::Copying,
        }
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    /// True while a skipped block is still open
    pub fn in_block(&self) -> bool {
        matches!(self.state, BlockState::Skipping { .. })
    }

    /// Advance over one line
    pub fn step(&mut self, line: &str, marker: Marker) -> LineAction {
        match self.state {
            BlockState::Skipping { depth, opened } => {
                self.skip_line(line, depth, opened);
                LineAction::Drop
            }
            BlockState::AfterBlock if line.trim().is_empty() => {
                self.state = BlockState::Copying;
                LineAction::Drop
            }
            BlockState::AfterBlock | BlockState::Copying => {
                self.state = BlockState::Copying;
                match marker {
                    Marker::None => LineAction::Emit,
                    Marker::Matching => LineAction::Drop,
                    Marker::Foreign => {
                        // The marker line's own braces belong to the block
                        self.skip_line(line, 0, false);
                        LineAction::Drop
                    }
                }
            }
        }
    }

    fn skip_line(&mut self, line: &str, mut depth: usize, mut opened: bool) {
        depth += line.matches('{').count();
        if opened || depth > 0 {
            opened = true;
            depth = depth.saturating_sub(line.matches('}').count());
            if depth == 0 {
                self.state = BlockState::AfterBlock;
                return;
            }
        }
        self.state = BlockState::Skipping { depth, opened };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(lines: &[(&str, Marker)]) -> Vec<LineAction> {
        let mut scanner = BlockScanner::new();
        lines.iter().map(|(l, m)| scanner.step(l, *m)).collect()
    }

    use LineAction::{Drop, Emit};

    #[test]
    fn test_untagged_lines_pass() {
        let actions = run(&[("a {", Marker::None), ("}", Marker::None), ("", Marker::None)]);
        assert_eq!(actions, vec![Emit, Emit, Emit]);
    }

    #[test]
    fn test_foreign_block_is_dropped_with_one_blank() {
        let actions = run(&[
            ("// #PI4", Marker::Foreign),
            ("fragment@1 {", Marker::None),
            ("  inner { x; };", Marker::None),
            ("};", Marker::None),
            ("", Marker::None),
            ("", Marker::None),
            ("keep;", Marker::None),
        ]);
        assert_eq!(actions, vec![Drop, Drop, Drop, Drop, Drop, Emit, Emit]);
    }

    #[test]
    fn test_blank_suppression_is_single_shot() {
        let mut scanner = BlockScanner::new();
        scanner.step("// #PI3", Marker::Foreign);
        scanner.step("a { };", Marker::None);
        assert_eq!(scanner.state(), BlockState::AfterBlock);
        assert_eq!(scanner.step("next;", Marker::None), Emit);
        assert_eq!(scanner.step("", Marker::None), Emit);
    }

    #[test]
    fn test_matching_marker_only_drops_itself() {
        let actions = run(&[
            ("// #PI5", Marker::Matching),
            ("a {", Marker::None),
            ("};", Marker::None),
        ]);
        assert_eq!(actions, vec![Drop, Emit, Emit]);
    }

    #[test]
    fn test_close_before_first_open_is_ignored() {
        let mut scanner = BlockScanner::new();
        scanner.step("// #PI4", Marker::Foreign);
        scanner.step("};", Marker::None);
        assert!(scanner.in_block());
        scanner.step("b {", Marker::None);
        assert_eq!(scanner.state(), BlockState::Skipping { depth: 1, opened: true });
        scanner.step("};", Marker::None);
        assert_eq!(scanner.state(), BlockState::AfterBlock);
    }

    #[test]
    fn test_marker_line_braces_count() {
        let mut scanner = BlockScanner::new();
        scanner.step("node { // #PI4", Marker::Foreign);
        assert_eq!(scanner.state(), BlockState::Skipping { depth: 1, opened: true });
        scanner.step("};", Marker::None);
        assert_eq!(scanner.state(), BlockState::AfterBlock);
    }

    #[test]
    fn test_back_to_back_foreign_blocks() {
        let actions = run(&[
            ("// #PI3", Marker::Foreign),
            ("a { };", Marker::None),
            ("// #PI4", Marker::Foreign),
            ("b { };", Marker::None),
            ("", Marker::None),
            ("c;", Marker::None),
        ]);
        assert_eq!(actions, vec![Drop, Drop, Drop, Drop, Drop, Emit]);
    }
}
