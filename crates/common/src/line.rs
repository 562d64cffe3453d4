//! Compiled source lines.
//!
//! The compiler flattens a block list into indented text lines, each tagged
//! with the index of the block that produced it. The tagged-text rendering
//! (`# @idx:N` suffix) is the compatibility boundary consumed by
//! highlighting UIs; the engine itself works on the typed tree.

use std::fmt;

/// Number of spaces per indent level in rendered output.
pub const INDENT: &str = "    ";

/// One compiled line: text, indent depth, and originating block index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledLine {
    /// The substituted template text (no leading indent, no tag).
    pub text: String,
    /// Indent depth in levels, never negative by construction.
    pub indent: usize,
    /// Index of the block this line came from. Multi-line templates tag
    /// every physical line so error and step attribution stays accurate.
    pub block_index: usize,
}

impl CompiledLine {
    pub fn new(text: impl Into<String>, indent: usize, block_index: usize) -> Self {
        CompiledLine {
            text: text.into(),
            indent,
            block_index,
        }
    }

    /// True for lines the engine skips without tagging a step.
    pub fn is_skippable(&self) -> bool {
        let trimmed = self.text.trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    }
}

impl fmt::Display for CompiledLine {
    /// Canonical tagged rendering: indent, text, then the step tag.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.indent {
            f.write_str(INDENT)?;
        }
        write!(f, "{}  # @idx:{}", self.text, self.block_index)
    }
}

/// Render a compiled line sequence as tagged source text.
pub fn render(lines: &[CompiledLine]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}
