//! Authored program blocks and the block catalog.
//!
//! A block is one step of a visual program: a type string, a parameter map,
//! and a code template with `{param}` placeholders. Nesting is implicit:
//! `loop_start`/`while_start`/`if_start` open a scope, `loop_end`/`if_end`
//! close it, and `else_start` continues an `if` at the same depth. There are
//! no parent/child references between blocks; program order is total order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::BlockError;

/// How a block participates in program structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRole {
    /// Opens a nested scope; depth increments after its line is emitted.
    Open,
    /// Closes a nested scope; depth decrements before its line is emitted.
    Close,
    /// `else_start`: decrements, emits at the `if` header's depth, re-increments.
    Else,
    /// Any non-structural block (a command or the `start` marker).
    Plain,
}

/// One authored program step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Type string selecting semantics (`forward`, `loop_start`, `var_set`, ...).
    pub kind: String,
    /// Parameter name → string value, substituted into the template.
    pub params: BTreeMap<String, String>,
    /// Code template with `{param}` placeholders.
    pub template: String,
}

impl Block {
    /// Build a block from a known catalog type.
    ///
    /// Returns [`BlockError::UnknownType`] if the type is not in the catalog.
    pub fn new(
        kind: impl Into<String>,
        params: BTreeMap<String, String>,
    ) -> Result<Self, BlockError> {
        let kind = kind.into();
        let template = template_for(&kind)
            .ok_or_else(|| BlockError::UnknownType(kind.clone()))?
            .to_string();
        Ok(Block {
            kind,
            params,
            template,
        })
    }

    /// Build a block with an explicit template, bypassing the catalog.
    pub fn with_template(
        kind: impl Into<String>,
        params: BTreeMap<String, String>,
        template: impl Into<String>,
    ) -> Self {
        Block {
            kind: kind.into(),
            params,
            template: template.into(),
        }
    }

    /// Structural role of this block's type.
    pub fn role(&self) -> BlockRole {
        match self.kind.as_str() {
            "loop_start" | "while_start" | "if_start" => BlockRole::Open,
            "loop_end" | "if_end" => BlockRole::Close,
            "else_start" => BlockRole::Else,
            _ => BlockRole::Plain,
        }
    }
}

/// The serde form of a block, as exported by the authoring UI:
/// `{"type": "forward", "params": {"distance": "3"}}`.
///
/// An optional `code` field overrides the catalog template (used by program
/// files that carry custom templates).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl BlockSpec {
    /// Resolve the spec against the catalog.
    pub fn into_block(self) -> Result<Block, BlockError> {
        match self.code {
            Some(code) => Ok(Block::with_template(self.kind, self.params, code)),
            None => Block::new(self.kind, self.params),
        }
    }
}

/// Code template for a catalog block type, or `None` for unknown types.
///
/// Closing markers compile to comment lines so the engine skips them without
/// counting a step; `start` is likewise a comment so it never tags.
pub fn template_for(kind: &str) -> Option<&'static str> {
    Some(match kind {
        "start" => "# program start",
        "forward" => "t.forward({distance})",
        "backward" => "t.backward({distance})",
        "move_dir" => "t.moveDir('{dir}', {count})",
        "turn_right" => "t.right({angle})",
        "turn_left" => "t.left({angle})",
        "penup" => "t.penup()",
        "pendown" => "t.pendown()",
        "fill_cell" => "t.fillcell()",
        "color" => "t.color('{color}')",
        "pensize" => "t.pensize({size})",
        "home" => "t.home()",
        "restart" => "t.restart()",
        "clear" => "t.clear()",
        "stamp" => "t.stamp()",
        "setheading" => "t.setheading({angle})",
        "wait" => "t.wait({seconds})",
        "get_value" => "t.getCurrentValue()",
        "set_value" => "t.setCurrentValue({value})",
        "var_set" => "var_set('{name}', {value})",
        "save_pos" => "t.savePos('{name}')",
        "restore_pos" => "t.restorePos('{name}')",
        "loop_start" => "for i in range({count}):",
        "loop_end" => "# end loop",
        "while_start" => "while {condition}:",
        "if_start" => "if {condition}:",
        "else_start" => "else:",
        "if_end" => "# end if",
        "break" => "break",
        _ => return None,
    })
}
