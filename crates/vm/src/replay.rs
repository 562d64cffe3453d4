//! The step/replay controller.
//!
//! Step-back has no undo log. Going back means replaying less far: reset
//! the machine and store to their zero state and re-run the program at zero
//! delay up to the target step count. This is correct because the engine
//! and machine are deterministic given the same program and no external
//! entropy.

use kame_common::{Program, RunConfig};

use crate::clock::{InstantClock, StepClock};
use crate::error::RuntimeError;
use crate::events::{EventSink, NullSink};
use crate::execute::Engine;
use crate::machine::{Machine, Mode};
use crate::store::VariableStore;

/// Owns one program together with the machine and store it runs against.
///
/// Exactly one execution is in flight at a time; the controller resets
/// state before every run, so a previous run never leaks into the next.
pub struct Session {
    machine: Machine,
    store: VariableStore,
    program: Program,
    current_step: u64,
}

impl Session {
    pub fn new(program: Program, config: RunConfig, mode: Mode) -> Self {
        Session {
            machine: Machine::new(config, mode),
            store: VariableStore::new(),
            program,
            current_step: 0,
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// How many steps of the program are currently applied.
    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    /// Run the whole program live, paced by `clock`.
    pub fn run(
        &mut self,
        clock: &mut dyn StepClock,
        events: &mut dyn EventSink,
    ) -> Result<(), RuntimeError> {
        self.machine.reset();
        self.store.reset();
        let result =
            Engine::new(&mut self.machine, &mut self.store, clock, events).run(&self.program);
        self.current_step = self.machine.step_count;
        result
    }

    /// Advance one step. Past the program end this clamps to the actual
    /// step count.
    pub fn step_forward(&mut self, events: &mut dyn EventSink) -> Result<(), RuntimeError> {
        self.step_to(self.current_step + 1, events)
    }

    /// Rewind one step; step 0 is the freshly reset state.
    pub fn step_back(&mut self, events: &mut dyn EventSink) -> Result<(), RuntimeError> {
        self.step_to(self.current_step.saturating_sub(1), events)
    }

    /// Deterministic bounded replay: reset, then re-run at zero delay until
    /// `target` steps have executed.
    pub fn step_to(
        &mut self,
        target: u64,
        events: &mut dyn EventSink,
    ) -> Result<(), RuntimeError> {
        self.machine.reset();
        self.store.reset();
        let mut clock = InstantClock;
        let result = Engine::bounded(
            &mut self.machine,
            &mut self.store,
            &mut clock,
            events,
            target,
        )
        .run(&self.program);
        self.current_step = self.machine.step_count;
        result
    }

    /// Request that a live run halt at its next poll point.
    pub fn stop(&mut self) {
        self.machine.break_flag = true;
    }

    /// Reset to the zero state without running anything.
    pub fn rewind(&mut self) {
        self.machine.reset();
        self.store.reset();
        self.current_step = 0;
    }

    /// Convenience for non-interactive callers: run to completion at zero
    /// delay with no event reporting.
    pub fn run_to_end(&mut self) -> Result<(), RuntimeError> {
        let mut clock = InstantClock;
        let mut events = NullSink;
        self.run(&mut clock, &mut events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kame_common::{Command, Node};

    fn forward(block_index: usize) -> Node {
        Node::Command {
            command: Command::Forward(1),
            block_index,
        }
    }

    fn session(nodes: Vec<Node>) -> Session {
        Session::new(Program::new(nodes), RunConfig::default(), Mode::Grid)
    }

    #[test]
    fn run_applies_all_steps() {
        let mut session = session(vec![forward(1), forward(2), forward(3)]);
        session.run_to_end().unwrap();
        assert_eq!(session.current_step(), 3);
        assert_eq!(session.machine().cell(), (3, 0));
    }

    #[test]
    fn step_forward_and_back_move_one_step() {
        let mut session = session(vec![forward(1), forward(2), forward(3)]);
        let mut events = NullSink;

        session.step_forward(&mut events).unwrap();
        assert_eq!(session.current_step(), 1);
        assert_eq!(session.machine().cell(), (1, 0));

        session.step_forward(&mut events).unwrap();
        assert_eq!(session.machine().cell(), (2, 0));

        session.step_back(&mut events).unwrap();
        assert_eq!(session.current_step(), 1);
        assert_eq!(session.machine().cell(), (1, 0));

        session.step_back(&mut events).unwrap();
        session.step_back(&mut events).unwrap(); // already at 0, stays there
        assert_eq!(session.current_step(), 0);
        assert_eq!(session.machine().cell(), (0, 0));
    }

    #[test]
    fn step_forward_clamps_at_program_end() {
        let mut session = session(vec![forward(1), forward(2)]);
        let mut events = NullSink;
        for _ in 0..5 {
            session.step_forward(&mut events).unwrap();
        }
        assert_eq!(session.current_step(), 2);
        assert_eq!(session.machine().cell(), (2, 0));
    }

    #[test]
    fn replay_is_deterministic() {
        let program = vec![
            Node::For {
                count: 2,
                body: vec![forward(1)],
                block_index: 0,
            },
            Node::Command {
                command: Command::SetVar("箱A".to_string(), "箱A + 5".to_string()),
                block_index: 2,
            },
        ];
        let mut session = session(program);
        let mut events = NullSink;

        session.step_to(4, &mut events).unwrap();
        let cell_first = session.machine().cell();
        let var_first = session.store().get("箱A").unwrap();

        session.step_to(0, &mut events).unwrap();
        assert_eq!(session.machine().cell(), (0, 0));
        assert_eq!(session.store().get("箱A").unwrap(), 0);

        session.step_to(4, &mut events).unwrap();
        assert_eq!(session.machine().cell(), cell_first);
        assert_eq!(session.store().get("箱A").unwrap(), var_first);
    }
}
