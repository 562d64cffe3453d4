//! Pluggable pacing between execution steps.
//!
//! The engine suspends through a [`StepClock`] after each command, so live
//! runs animate at the configured speed while bounded replay substitutes a
//! zero-delay clock and becomes synchronous and deterministic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Cooperative suspension point between steps.
pub trait StepClock {
    /// Pause for `ms` milliseconds. Returning `false` cancels the run at the
    /// next poll point.
    fn pause(&mut self, ms: u64) -> bool;
}

/// Wall-clock pacing for live runs, with an external stop handle.
pub struct RealtimeClock {
    cancel: Arc<AtomicBool>,
}

impl RealtimeClock {
    pub fn new() -> Self {
        RealtimeClock {
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle a UI or signal handler can set to stop the run.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }
}

impl Default for RealtimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl StepClock for RealtimeClock {
    fn pause(&mut self, ms: u64) -> bool {
        if self.cancel.load(Ordering::Relaxed) {
            return false;
        }
        thread::sleep(Duration::from_millis(ms));
        !self.cancel.load(Ordering::Relaxed)
    }
}

/// Zero-delay clock for bounded replay and tests.
pub struct InstantClock;

impl StepClock for InstantClock {
    fn pause(&mut self, _ms: u64) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_clock_never_cancels() {
        let mut clock = InstantClock;
        assert!(clock.pause(1_000_000));
    }

    #[test]
    fn realtime_clock_cancel_handle_stops_pausing() {
        let mut clock = RealtimeClock::new();
        let handle = clock.cancel_handle();
        assert!(clock.pause(0));
        handle.store(true, Ordering::Relaxed);
        assert!(!clock.pause(0));
    }
}
