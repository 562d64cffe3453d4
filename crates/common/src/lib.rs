//! Common types for kame block programs.
//!
//! This crate provides the foundational data structures shared by the
//! compiler and the virtual machine:
//!
//! - [`Block`] — one authored program step (type, parameter map, code template)
//! - [`BlockSpec`] — the serde form of a block as exported by authoring UIs
//! - [`CompiledLine`] — a tagged, indented source line (the highlighting boundary)
//! - [`Command`] — typed command nodes with already-parsed operands
//! - [`Node`] / [`Program`] — the typed program tree the engine interprets
//! - [`RunConfig`] — grid dimension, canvas size, and animation speed mapping
//!
//! # Dependencies
//!
//! This crate uses `thiserror` and `serde` (derive only) and has no other
//! dependencies.

pub mod ast;
pub mod block;
pub mod command;
pub mod config;
pub mod error;
pub mod line;

// Re-export commonly used types at the crate root.
pub use ast::{Node, Program};
pub use block::{Block, BlockRole, BlockSpec};
pub use command::{Command, Direction};
pub use config::{RunConfig, MAX_BLOCKS};
pub use error::BlockError;
pub use line::CompiledLine;
