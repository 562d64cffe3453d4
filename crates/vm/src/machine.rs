//! The virtual turtle/grid machine.
//!
//! The machine records logical state only: position, heading, pen, per-cell
//! grid contents and fill colors, motion trail segments, and stamp marks.
//! A renderer or challenge checker reads this state; the machine never draws.
//!
//! In grid mode, position is a (column, row) cell coordinate and headings
//! snap to 90° multiples at move time. In free mode, position is a pixel
//! coordinate on a margin-bounded canvas and headings are continuous.
//!
//! Once `has_error` is set, every motion operation is a no-op, so a single
//! boundary failure halts all further physical effects for the rest of the
//! run without each call site re-checking.

use std::collections::BTreeMap;

use kame_common::{Direction, RunConfig};

use crate::error::RuntimeError;

/// Free-mode boundary margin in pixels.
pub const CANVAS_MARGIN: f64 = 5.0;

/// Execution mode, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// N×N board, cell-coordinate movement, axis-aligned headings.
    Grid,
    /// Continuous pixel movement on a margin-bounded canvas.
    Free,
}

/// One recorded motion. `pen_down` tells the renderer whether the motion
/// leaves a visible line.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub color: String,
    pub width: u32,
    pub pen_down: bool,
}

/// A non-destructive visual mark at a position and heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamp {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SavedPos {
    x: f64,
    y: f64,
    heading: f64,
}

/// The virtual machine state.
pub struct Machine {
    mode: Mode,
    config: RunConfig,
    x: f64,
    y: f64,
    heading: f64,
    pen_down: bool,
    color: String,
    pen_size: u32,
    grid_data: Vec<Vec<i64>>,
    cell_colors: Vec<Vec<Option<String>>>,
    trail: Vec<Segment>,
    stamps: Vec<Stamp>,
    saved: BTreeMap<String, SavedPos>,

    /// Set by a boundary failure; cleared only by reset.
    pub has_error: bool,
    /// Set by `break`; cleared by the innermost enclosing loop.
    pub break_flag: bool,
    /// Set when a bounded replay reaches its target or a clock cancels;
    /// propagates outward through every enclosing loop.
    pub step_break: bool,
    /// Count of executed, tagged steps.
    pub step_count: u64,
    /// Block index of the last highlighted step (error attribution site).
    pub current_block: usize,
}

impl Machine {
    pub fn new(config: RunConfig, mode: Mode) -> Self {
        let size = config.grid_size;
        let mut machine = Machine {
            mode,
            config,
            x: 0.0,
            y: 0.0,
            heading: 0.0,
            pen_down: false,
            color: String::new(),
            pen_size: 1,
            grid_data: vec![vec![0; size]; size],
            cell_colors: vec![vec![None; size]; size],
            trail: Vec::new(),
            stamps: Vec::new(),
            saved: BTreeMap::new(),
            has_error: false,
            break_flag: false,
            step_break: false,
            step_count: 0,
            current_block: 0,
        };
        machine.reset();
        machine
    }

    /// Grid-mode machine with the given configuration.
    pub fn grid(config: RunConfig) -> Self {
        Self::new(config, Mode::Grid)
    }

    /// Free-mode machine with the given configuration.
    pub fn free(config: RunConfig) -> Self {
        Self::new(config, Mode::Free)
    }

    /// Return to the zero state. Mode and configuration are preserved; only
    /// an explicit mode change reinitializes the board shape.
    pub fn reset(&mut self) {
        let size = self.config.grid_size;
        self.grid_data = vec![vec![0; size]; size];
        self.cell_colors = vec![vec![None; size]; size];
        self.trail.clear();
        self.stamps.clear();
        self.saved.clear();
        self.go_home();
        // Pen starts up in grid mode (fillCell paints), down in free mode.
        self.pen_down = self.mode == Mode::Free;
        self.color = "black".to_string();
        self.pen_size = 2;
        self.has_error = false;
        self.break_flag = false;
        self.step_break = false;
        self.step_count = 0;
        self.current_block = 0;
    }

    // ---- Queries ----

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Position: (column, row) cells in grid mode, pixels in free mode.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Current cell, rounding the continuous position to the nearest cell.
    pub fn cell(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }

    /// Heading in canvas degrees: 0 = right, 90 = down.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn pen_is_down(&self) -> bool {
        self.pen_down
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn pen_size(&self) -> u32 {
        self.pen_size
    }

    pub fn grid_data(&self) -> &[Vec<i64>] {
        &self.grid_data
    }

    pub fn cell_colors(&self) -> &[Vec<Option<String>>] {
        &self.cell_colors
    }

    pub fn trail(&self) -> &[Segment] {
        &self.trail
    }

    pub fn stamps(&self) -> &[Stamp] {
        &self.stamps
    }

    // ---- Motion ----

    pub fn forward(&mut self, distance: i64) -> Result<(), RuntimeError> {
        self.advance(distance as f64)
    }

    pub fn backward(&mut self, distance: i64) -> Result<(), RuntimeError> {
        self.advance(-(distance as f64))
    }

    /// Turn to an absolute direction, then move. The heading change sticks.
    pub fn move_dir(&mut self, dir: Direction, distance: i64) -> Result<(), RuntimeError> {
        if self.has_error {
            return Ok(());
        }
        self.heading = dir.heading();
        self.advance(distance as f64)
    }

    pub fn turn_right(&mut self, angle: i64) {
        if self.has_error {
            return;
        }
        self.heading = normalize(self.heading + self.snap_turn(angle));
    }

    pub fn turn_left(&mut self, angle: i64) {
        if self.has_error {
            return;
        }
        self.heading = normalize(self.heading - self.snap_turn(angle));
    }

    /// Set an absolute heading in turtle convention (0 = right, 90 = up);
    /// the sign flips to canvas orientation.
    pub fn set_heading(&mut self, angle: i64) {
        self.heading = normalize(-(angle as f64));
    }

    /// Return to the home position without drawing, resetting the heading.
    pub fn home(&mut self) {
        self.go_home();
    }

    /// Alias of [`Machine::home`] kept for the block catalog.
    pub fn restart(&mut self) {
        self.go_home();
    }

    fn go_home(&mut self) {
        match self.mode {
            Mode::Grid => {
                self.x = 0.0;
                self.y = 0.0;
                self.heading = 0.0;
            }
            Mode::Free => {
                self.x = self.config.canvas_width / 2.0;
                self.y = self.config.canvas_height / 2.0;
                self.heading = normalize(-90.0);
            }
        }
    }

    fn advance(&mut self, distance: f64) -> Result<(), RuntimeError> {
        if self.has_error {
            return Ok(());
        }
        match self.mode {
            Mode::Grid => {
                let (col, row) = self.cell();
                let (dx, dy) = grid_delta(self.heading);
                let target_col = col + (dx * distance.round() as i64);
                let target_row = row + (dy * distance.round() as i64);
                let size = self.config.grid_size as i64;
                if target_col < 0 || target_col >= size || target_row < 0 || target_row >= size {
                    self.has_error = true;
                    return Err(RuntimeError::OffGrid {
                        col: target_col,
                        row: target_row,
                    });
                }
                self.record_move(target_col as f64, target_row as f64);
            }
            Mode::Free => {
                let radians = self.heading.to_radians();
                let new_x = self.x + distance * radians.cos();
                let new_y = self.y + distance * radians.sin();
                if new_x < CANVAS_MARGIN
                    || new_x > self.config.canvas_width - CANVAS_MARGIN
                    || new_y < CANVAS_MARGIN
                    || new_y > self.config.canvas_height - CANVAS_MARGIN
                {
                    self.has_error = true;
                    return Err(RuntimeError::OffCanvas {
                        x: new_x.round() as i64,
                        y: new_y.round() as i64,
                    });
                }
                self.record_move(new_x, new_y);
            }
        }
        Ok(())
    }

    fn record_move(&mut self, x: f64, y: f64) {
        self.trail.push(Segment {
            from: (self.x, self.y),
            to: (x, y),
            color: self.color.clone(),
            width: self.pen_size,
            pen_down: self.pen_down,
        });
        self.x = x;
        self.y = y;
    }

    /// Grid mode constrains turns to 90° multiples.
    fn snap_turn(&self, angle: i64) -> f64 {
        let angle = angle as f64;
        match self.mode {
            Mode::Grid => (angle / 90.0).round() * 90.0,
            Mode::Free => angle,
        }
    }

    // ---- Pen and drawing state ----

    pub fn set_pen(&mut self, down: bool) {
        self.pen_down = down;
    }

    pub fn set_color(&mut self, color: &str) {
        self.color = color.to_string();
    }

    pub fn set_pen_size(&mut self, size: u32) {
        self.pen_size = size;
    }

    /// Paint the current cell with the active color. Grid mode only, and
    /// only while the pen is down.
    pub fn fill_cell(&mut self) {
        if self.has_error || !self.pen_down {
            return;
        }
        if self.mode != Mode::Grid {
            tracing::warn!("fill_cell is only available in grid mode");
            return;
        }
        let (col, row) = self.cell();
        let color = self.color.clone();
        if let Some(slot) = self.color_slot(col, row) {
            *slot = Some(color);
        }
    }

    pub fn stamp(&mut self) {
        if self.has_error {
            return;
        }
        self.stamps.push(Stamp {
            x: self.x,
            y: self.y,
            heading: self.heading,
        });
    }

    /// Wipe the drawing surface (trail, stamps, fills, cell values) but keep
    /// cursor position, heading, pen, color, flags, and the step counter.
    pub fn clear(&mut self) {
        let size = self.config.grid_size;
        self.trail.clear();
        self.stamps.clear();
        self.grid_data = vec![vec![0; size]; size];
        self.cell_colors = vec![vec![None; size]; size];
    }

    // ---- Cell values ----

    /// Numeric content of the current cell; 0 outside grid mode or bounds.
    pub fn cell_value(&self) -> i64 {
        if self.has_error {
            return 0;
        }
        if self.mode != Mode::Grid {
            tracing::warn!("cell_value is only available in grid mode");
            return 0;
        }
        let (col, row) = self.cell();
        self.value_at(col, row).unwrap_or(0)
    }

    /// Write the current cell's numeric content; no-op outside grid
    /// mode or bounds.
    pub fn set_cell_value(&mut self, value: i64) {
        if self.has_error {
            return;
        }
        if self.mode != Mode::Grid {
            tracing::warn!("set_cell_value is only available in grid mode");
            return;
        }
        let (col, row) = self.cell();
        let in_bounds = self.in_bounds(col, row);
        if in_bounds {
            self.grid_data[row as usize][col as usize] = value;
        }
    }

    /// Numeric content of an arbitrary cell, for checkers and tests.
    pub fn value_at(&self, col: i64, row: i64) -> Option<i64> {
        if !self.in_bounds(col, row) {
            return None;
        }
        Some(self.grid_data[row as usize][col as usize])
    }

    /// Fill color of an arbitrary cell.
    pub fn color_at(&self, col: i64, row: i64) -> Option<&str> {
        if !self.in_bounds(col, row) {
            return None;
        }
        self.cell_colors[row as usize][col as usize].as_deref()
    }

    fn color_slot(&mut self, col: i64, row: i64) -> Option<&mut Option<String>> {
        if !self.in_bounds(col, row) {
            return None;
        }
        Some(&mut self.cell_colors[row as usize][col as usize])
    }

    fn in_bounds(&self, col: i64, row: i64) -> bool {
        let size = self.config.grid_size as i64;
        (0..size).contains(&col) && (0..size).contains(&row)
    }

    // ---- Position bookmarks ----

    pub fn save_pos(&mut self, name: &str) {
        self.saved.insert(
            name.to_string(),
            SavedPos {
                x: self.x,
                y: self.y,
                heading: self.heading,
            },
        );
    }

    /// Move back to a bookmark. Unknown names are a no-op.
    pub fn restore_pos(&mut self, name: &str) {
        let Some(pos) = self.saved.get(name).copied() else {
            return;
        };
        self.record_move(pos.x, pos.y);
        self.heading = pos.heading;
    }
}

/// Axis step for a grid heading, snapped to the nearest 90° multiple.
/// 0 = +column, 90 = +row (down), 180 = −column, 270 = −row.
fn grid_delta(heading: f64) -> (i64, i64) {
    let quadrant = ((heading / 90.0).round() as i64).rem_euclid(4);
    match quadrant {
        0 => (1, 0),
        1 => (0, 1),
        2 => (-1, 0),
        _ => (0, -1),
    }
}

fn normalize(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}
