//! kame compiler — block list to tagged lines, tagged lines to program tree.
//!
//! Compilation is two mechanical passes. The first flattens the authored
//! block list into indented source lines, substituting parameters into each
//! block's template and tagging every line with its block index. The second
//! parses those lines once into the typed tree the engine interprets, so no
//! structure is re-derived from text at run time.
//!
//! # Usage
//!
//! ```
//! use std::collections::BTreeMap;
//! use kame_common::{line::render, Block};
//! use kame_compiler::{compile, parse};
//!
//! let mut params = BTreeMap::new();
//! params.insert("distance".to_string(), "3".to_string());
//! let blocks = vec![
//!     Block::new("start", BTreeMap::new()).unwrap(),
//!     Block::new("forward", params).unwrap(),
//! ];
//!
//! let lines = compile(&blocks).unwrap();
//! assert_eq!(
//!     render(&lines),
//!     "# program start  # @idx:0\nt.forward(3)  # @idx:1\n"
//! );
//!
//! let program = parse(&lines).unwrap();
//! assert_eq!(program.nodes.len(), 1);
//! ```

pub mod error;

mod parse;

pub use error::CompileError;
pub use parse::parse;

use kame_common::block::BlockRole;
use kame_common::{Block, BlockSpec, CompiledLine, Program, MAX_BLOCKS};

/// Resolve serde block specs against the catalog.
///
/// Returns the first unknown block type. Fix one error at a time.
pub fn resolve(specs: Vec<BlockSpec>) -> Result<Vec<Block>, CompileError> {
    specs
        .into_iter()
        .enumerate()
        .map(|(block_index, spec)| {
            let kind = spec.kind.clone();
            spec.into_block()
                .map_err(|_| CompileError::UnknownBlock { block_index, kind })
        })
        .collect()
}

/// Compile a block list into tagged, indented source lines.
///
/// Closing blocks dedent before emitting, `else_start` dedents, emits, and
/// re-indents, and opening blocks indent after emitting. Depth never goes
/// below zero, so unmatched closers cannot produce negative indentation.
pub fn compile(blocks: &[Block]) -> Result<Vec<CompiledLine>, CompileError> {
    if blocks.len() > MAX_BLOCKS {
        return Err(CompileError::TooManyBlocks {
            count: blocks.len(),
            max: MAX_BLOCKS,
        });
    }

    let mut lines = Vec::new();
    let mut depth = 0usize;
    for (block_index, block) in blocks.iter().enumerate() {
        let text = substitute(&block.template, block);
        match block.role() {
            BlockRole::Close => {
                depth = depth.saturating_sub(1);
                emit(&mut lines, &text, depth, block_index);
            }
            BlockRole::Else => {
                let header_depth = depth.saturating_sub(1);
                emit(&mut lines, &text, header_depth, block_index);
                depth = header_depth + 1;
            }
            BlockRole::Open => {
                emit(&mut lines, &text, depth, block_index);
                depth += 1;
            }
            BlockRole::Plain => emit(&mut lines, &text, depth, block_index),
        }
    }
    Ok(lines)
}

/// Compile and parse in one call.
pub fn build(blocks: &[Block]) -> Result<(Vec<CompiledLine>, Program), CompileError> {
    let lines = compile(blocks)?;
    let program = parse(&lines)?;
    Ok((lines, program))
}

/// Substitute each parameter into the template, first occurrence only.
///
/// First-occurrence substitution means a parameter value containing another
/// placeholder is never re-expanded.
fn substitute(template: &str, block: &Block) -> String {
    let mut text = template.to_string();
    for (key, value) in &block.params {
        text = text.replacen(&format!("{{{key}}}"), value, 1);
    }
    text
}

/// Push every physical line of `text` at the given depth. Multi-line
/// templates tag each line with the same block index.
fn emit(lines: &mut Vec<CompiledLine>, text: &str, depth: usize, block_index: usize) {
    for part in text.split('\n') {
        lines.push(CompiledLine::new(part, depth, block_index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn block(kind: &str, pairs: &[(&str, &str)]) -> Block {
        Block::new(kind, params(pairs)).unwrap()
    }

    #[test]
    fn compile_flat_sequence() {
        let blocks = vec![
            block("start", &[]),
            block("forward", &[("distance", "3")]),
            block("turn_right", &[("angle", "90")]),
        ];
        let lines = compile(&blocks).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text, "t.forward(3)");
        assert_eq!(lines[1].indent, 0);
        assert_eq!(lines[2].block_index, 2);
    }

    #[test]
    fn compile_nested_loop_indents_body() {
        let blocks = vec![
            block("loop_start", &[("count", "4")]),
            block("forward", &[("distance", "1")]),
            block("turn_right", &[("angle", "90")]),
            block("loop_end", &[]),
        ];
        let lines = compile(&blocks).unwrap();
        assert_eq!(lines[0].text, "for i in range(4):");
        assert_eq!(lines[0].indent, 0);
        assert_eq!(lines[1].indent, 1);
        assert_eq!(lines[2].indent, 1);
        assert_eq!(lines[3].text, "# end loop");
        assert_eq!(lines[3].indent, 0);
    }

    #[test]
    fn compile_else_emits_at_header_depth() {
        let blocks = vec![
            block("if_start", &[("condition", "箱A > 0")]),
            block("forward", &[("distance", "1")]),
            block("else_start", &[]),
            block("backward", &[("distance", "1")]),
            block("if_end", &[]),
        ];
        let lines = compile(&blocks).unwrap();
        assert_eq!(lines[0].indent, 0);
        assert_eq!(lines[1].indent, 1);
        assert_eq!(lines[2].text, "else:");
        assert_eq!(lines[2].indent, 0);
        assert_eq!(lines[3].indent, 1);
        assert_eq!(lines[4].indent, 0);
    }

    #[test]
    fn compile_unmatched_close_clamps_at_zero() {
        let blocks = vec![
            block("loop_end", &[]),
            block("forward", &[("distance", "1")]),
        ];
        let lines = compile(&blocks).unwrap();
        assert_eq!(lines[0].indent, 0);
        assert_eq!(lines[1].indent, 0);
    }

    #[test]
    fn compile_rejects_oversized_program() {
        let blocks: Vec<Block> = (0..MAX_BLOCKS + 1)
            .map(|_| block("penup", &[]))
            .collect();
        let err = compile(&blocks).unwrap_err();
        assert_eq!(
            err,
            CompileError::TooManyBlocks {
                count: MAX_BLOCKS + 1,
                max: MAX_BLOCKS,
            }
        );
    }

    #[test]
    fn substitute_is_first_occurrence_only() {
        let b = Block::with_template("custom", params(&[("n", "{n}")]), "t.forward({n})");
        assert_eq!(substitute(&b.template, &b), "t.forward({n})");
    }

    #[test]
    fn multi_line_template_tags_every_line() {
        let b = Block::with_template("custom", BTreeMap::new(), "t.penup()\nt.home()");
        let lines = compile(std::slice::from_ref(&b)).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].block_index, 0);
        assert_eq!(lines[1].block_index, 0);
    }

    #[test]
    fn resolve_reports_unknown_kind_with_index() {
        let specs = vec![
            BlockSpec {
                kind: "penup".to_string(),
                params: BTreeMap::new(),
                code: None,
            },
            BlockSpec {
                kind: "teleport".to_string(),
                params: BTreeMap::new(),
                code: None,
            },
        ];
        let err = resolve(specs).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownBlock {
                block_index: 1,
                kind: "teleport".to_string(),
            }
        );
    }
}
