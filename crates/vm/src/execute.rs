//! The tree-walking execution engine.
//!
//! Walks the typed program tree, evaluating conditions through the
//! expression evaluator and issuing commands to the machine and store.
//! Every node is a tagged step: executing it bumps the step counter and
//! emits a highlight event for its block index.
//!
//! Flag discipline: `break_flag` stops the current scope and is cleared by
//! the innermost enclosing loop, so a `break` never escapes its own loop.
//! `step_break` (bounded-replay budget reached, or clock cancellation) is
//! never cleared and propagates outward through every enclosing loop.
//! `has_error` freezes the machine and unwinds to the run entry point.

use kame_common::{Command, Node, Program};

use crate::clock::StepClock;
use crate::error::RuntimeError;
use crate::eval::{evaluate, evaluate_i64, evaluate_truthy};
use crate::events::EventSink;
use crate::machine::Machine;
use crate::store::VariableStore;

/// One program execution over borrowed machine and store state.
pub struct Engine<'a> {
    machine: &'a mut Machine,
    store: &'a mut VariableStore,
    clock: &'a mut dyn StepClock,
    events: &'a mut dyn EventSink,
    interval_ms: u64,
    step_budget: Option<u64>,
}

impl<'a> Engine<'a> {
    /// Live engine: paces itself at the configured speed interval.
    pub fn new(
        machine: &'a mut Machine,
        store: &'a mut VariableStore,
        clock: &'a mut dyn StepClock,
        events: &'a mut dyn EventSink,
    ) -> Self {
        let interval_ms = machine.config().interval_ms();
        Engine {
            machine,
            store,
            clock,
            events,
            interval_ms,
            step_budget: None,
        }
    }

    /// Bounded engine: stops after `target` executed steps. Used with a
    /// zero-delay clock for deterministic replay.
    pub fn bounded(
        machine: &'a mut Machine,
        store: &'a mut VariableStore,
        clock: &'a mut dyn StepClock,
        events: &'a mut dyn EventSink,
        target: u64,
    ) -> Self {
        let mut engine = Self::new(machine, store, clock, events);
        engine.step_budget = Some(target);
        engine
    }

    /// Execute a whole program from the current machine/store state.
    ///
    /// A fatal error is attributed to the last highlighted block index and
    /// reported through the event sink before propagating.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        match self.exec_body(&program.nodes) {
            Ok(()) => {
                if !self.machine.has_error {
                    self.events.finished();
                }
                Ok(())
            }
            Err(err) => {
                self.machine.has_error = true;
                self.events.failed(&err.to_string(), self.machine.current_block);
                Err(err)
            }
        }
    }

    fn exec_body(&mut self, nodes: &[Node]) -> Result<(), RuntimeError> {
        for node in nodes {
            if self.halted() {
                break;
            }
            match node {
                Node::Command { command, block_index } => {
                    if !self.tag(*block_index) {
                        return Ok(());
                    }
                    self.apply(command)?;
                    self.pause_between_steps();
                }
                Node::Break { block_index } => {
                    if !self.tag(*block_index) {
                        return Ok(());
                    }
                    self.machine.break_flag = true;
                    break;
                }
                Node::If {
                    condition,
                    then_body,
                    else_body,
                    block_index,
                } => {
                    if !self.tag(*block_index) {
                        return Ok(());
                    }
                    if evaluate_truthy(condition, self.machine, self.store) {
                        self.exec_body(then_body)?;
                    } else {
                        self.exec_body(else_body)?;
                    }
                    if self.halted() {
                        break;
                    }
                    self.pause_between_steps();
                }
                Node::While {
                    condition,
                    body,
                    block_index,
                } => {
                    if !self.tag(*block_index) {
                        return Ok(());
                    }
                    while !self.halted() && evaluate_truthy(condition, self.machine, self.store)
                    {
                        self.exec_body(body)?;
                    }
                    // A break stops only its own loop.
                    self.machine.break_flag = false;
                }
                Node::For {
                    count,
                    body,
                    block_index,
                } => {
                    if !self.tag(*block_index) {
                        return Ok(());
                    }
                    for _ in 0..*count {
                        if self.halted() {
                            break;
                        }
                        self.exec_body(body)?;
                    }
                    self.machine.break_flag = false;
                }
            }
        }
        Ok(())
    }

    /// Count and highlight a step. Returns `false` when the replay budget
    /// is spent; the node must not execute and the whole walk stops.
    fn tag(&mut self, block_index: usize) -> bool {
        if let Some(budget) = self.step_budget {
            if self.machine.step_count >= budget {
                self.machine.step_break = true;
                return false;
            }
        }
        self.machine.step_count += 1;
        self.machine.current_block = block_index;
        self.events.highlight(block_index);
        self.events.step(self.machine.step_count);
        true
    }

    fn halted(&self) -> bool {
        self.machine.has_error || self.machine.break_flag || self.machine.step_break
    }

    /// The sole scheduling point: suspend for the animation interval. A
    /// cancelled clock halts the walk at the next poll.
    fn pause_between_steps(&mut self) {
        if !self.clock.pause(self.interval_ms) {
            self.machine.step_break = true;
        }
    }

    fn apply(&mut self, command: &Command) -> Result<(), RuntimeError> {
        match command {
            Command::Forward(n) => self.machine.forward(*n)?,
            Command::Backward(n) => self.machine.backward(*n)?,
            Command::MoveDir(dir, n) => self.machine.move_dir(*dir, *n)?,
            Command::TurnRight(a) => self.machine.turn_right(*a),
            Command::TurnLeft(a) => self.machine.turn_left(*a),
            Command::PenUp => self.machine.set_pen(false),
            Command::PenDown => self.machine.set_pen(true),
            Command::FillCell => self.machine.fill_cell(),
            Command::SetColor(color) => self.machine.set_color(color),
            Command::PenSize(size) => self.machine.set_pen_size(*size),
            Command::Home => self.machine.home(),
            Command::Restart => self.machine.restart(),
            Command::Clear => self.machine.clear(),
            Command::Stamp => self.machine.stamp(),
            Command::SetHeading(a) => self.machine.set_heading(*a),
            Command::Wait(expr) => {
                let seconds = evaluate(expr, self.machine, self.store).number().max(0.0);
                let ms = (seconds * 1000.0).round() as u64;
                if !self.clock.pause(ms) {
                    self.machine.step_break = true;
                }
            }
            Command::GetCellValue => {
                tracing::debug!(value = self.machine.cell_value(), "current cell value");
            }
            Command::SetCellValue(expr) => {
                let value = evaluate_i64(expr, self.machine, self.store);
                self.machine.set_cell_value(value);
            }
            Command::SetVar(name, expr) => {
                let value = evaluate_i64(expr, self.machine, self.store);
                self.store.set(name, value);
            }
            Command::SavePos(name) => self.machine.save_pos(name),
            Command::RestorePos(name) => self.machine.restore_pos(name),
            Command::Noop => {}
        }
        Ok(())
    }
}
