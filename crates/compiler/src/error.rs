//! Error types for the kame compiler.

use thiserror::Error;

/// Errors produced while compiling a block list or parsing compiled lines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The block list exceeds the program ceiling.
    #[error("program has {count} blocks, maximum is {max}")]
    TooManyBlocks { count: usize, max: usize },

    /// A block kind is not in the catalog.
    #[error("block {block_index}: unknown block type '{kind}'")]
    UnknownBlock { block_index: usize, kind: String },

    /// A loop or conditional header has an empty condition or count.
    #[error("block {block_index}: malformed header '{text}'")]
    MalformedHeader { block_index: usize, text: String },
}
