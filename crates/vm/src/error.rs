//! Error types for the kame virtual machine.

use thiserror::Error;

/// Errors raised during program execution.
///
/// Boundary and store errors are fatal to the run: they unwind to the run
/// entry point, which records the offending block index and leaves the
/// machine halted for inspection. Expression parse failures are not here;
/// the evaluator recovers locally and never unwinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A grid-mode move would land outside the board.
    #[error("cannot move outside the grid (target cell column {col}, row {row})")]
    OffGrid { col: i64, row: i64 },

    /// A free-mode move would leave the canvas margin.
    #[error("cannot move outside the canvas (target x {x}, y {y})")]
    OffCanvas { x: i64, y: i64 },

    /// A variable was read before being created.
    #[error("variable \"{name}\" not found")]
    UnknownVariable { name: String },

    /// A variable was created twice.
    #[error("variable \"{name}\" already exists")]
    DuplicateVariable { name: String },

    /// An array was accessed before being created.
    #[error("array \"{name}\" not found")]
    UnknownArray { name: String },

    /// An array was created twice.
    #[error("array \"{name}\" already exists")]
    DuplicateArray { name: String },

    /// An array was created with a zero length.
    #[error("array \"{name}\" must have at least one element")]
    InvalidArraySize { name: String },

    /// An array element access fell outside the array.
    #[error("index {index} is out of range (array size: {size})")]
    IndexOutOfRange { index: i64, size: usize },
}
