//! kame virtual machine — turtle/grid state, expression evaluation, and the
//! stepped execution engine.
//!
//! The crate is layered leaf-first:
//!
//! - [`VariableStore`] — named scalar and array slots with reserved
//!   variables that survive every reset
//! - [`Machine`] — the virtual turtle/grid machine (logical state only;
//!   rendering is someone else's job)
//! - [`eval`] — the arithmetic/comparison/boolean expression evaluator with
//!   sensor and variable substitution
//! - [`Engine`] — the tree-walking interpreter with step tagging, highlight
//!   events, and cooperative pacing through a [`StepClock`]
//! - [`Session`] — the step/replay controller implementing step-back as
//!   deterministic bounded replay from a clean reset
//!
//! # Usage
//!
//! ```
//! use kame_vm::{Mode, NullSink, Session};
//! use kame_common::{Command, Node, Program, RunConfig};
//!
//! let program = Program::new(vec![Node::Command {
//!     command: Command::Forward(3),
//!     block_index: 1,
//! }]);
//! let mut session = Session::new(program, RunConfig::default(), Mode::Grid);
//! session.run_to_end().unwrap();
//! assert_eq!(session.machine().cell(), (3, 0));
//! assert_eq!(session.current_step(), 1);
//! ```

pub mod clock;
pub mod error;
pub mod eval;
pub mod events;
pub mod execute;
pub mod machine;
pub mod replay;
pub mod store;

pub use clock::{InstantClock, RealtimeClock, StepClock};
pub use error::RuntimeError;
pub use eval::{evaluate, evaluate_i64, evaluate_truthy, Value};
pub use events::{EventSink, NullSink};
pub use execute::Engine;
pub use machine::{Machine, Mode, Segment, Stamp, CANVAS_MARGIN};
pub use replay::Session;
pub use store::{VariableStore, RESERVED};
