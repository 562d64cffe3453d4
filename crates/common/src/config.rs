//! Run configuration: grid dimension, canvas geometry, speed mapping.

/// Maximum number of blocks a program may contain. Exceeding it is rejected
/// before compilation, never at run time.
pub const MAX_BLOCKS: usize = 200;

/// Configuration consumed by the machine and engine.
///
/// The speed level survives machine resets; only an explicit mode change
/// reinitializes the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Cells per side of the square grid (grid mode).
    pub grid_size: usize,
    /// Canvas width in pixels (free mode).
    pub canvas_width: f64,
    /// Canvas height in pixels (free mode).
    pub canvas_height: f64,
    /// Animation speed level, 0 (slowest) to 10 (fastest).
    pub speed_level: u8,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            grid_size: 10,
            canvas_width: 500.0,
            canvas_height: 500.0,
            speed_level: 5,
        }
    }
}

impl RunConfig {
    /// Animation interval for this config's speed level.
    pub fn interval_ms(&self) -> u64 {
        speed_interval_ms(self.speed_level)
    }
}

/// Map a discrete speed level (0-10) to a millisecond interval.
///
/// Level 5 is 600 ms, stepping 200 ms per level up to 7; the fast end is
/// non-linear: 8 is 100 ms, 9 is 50 ms, 10 is 10 ms. Never below 10 ms.
pub fn speed_interval_ms(level: u8) -> u64 {
    match level {
        0..=7 => (1600 - u64::from(level) * 200).max(10),
        8 => 100,
        9 => 50,
        _ => 10,
    }
}
