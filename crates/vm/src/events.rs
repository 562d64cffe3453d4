//! Execution event reporting.
//!
//! The engine reports progress through an [`EventSink`] so front ends can
//! update step counters and block highlighting without the engine knowing
//! anything about presentation.

/// Observer for execution progress.
///
/// Default implementations do nothing, so sinks implement only the events
/// they care about.
pub trait EventSink {
    /// The executed-step counter changed.
    fn step(&mut self, _step_count: u64) {}

    /// The block at this index is about to execute and should be highlighted.
    fn highlight(&mut self, _block_index: usize) {}

    /// The run completed without a fatal error.
    fn finished(&mut self) {}

    /// The run halted with a fatal error attributed to a block.
    fn failed(&mut self, _message: &str, _block_index: usize) {}
}

/// Sink that discards every event.
pub struct NullSink;

impl EventSink for NullSink {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        highlights: Vec<usize>,
        steps: Vec<u64>,
    }

    impl EventSink for Recorder {
        fn step(&mut self, step_count: u64) {
            self.steps.push(step_count);
        }

        fn highlight(&mut self, block_index: usize) {
            self.highlights.push(block_index);
        }
    }

    #[test]
    fn default_methods_are_noops() {
        let mut sink = NullSink;
        sink.step(1);
        sink.highlight(2);
        sink.finished();
        sink.failed("boom", 3);
    }

    #[test]
    fn partial_implementations_record_what_they_want() {
        let mut sink = Recorder::default();
        sink.step(1);
        sink.highlight(4);
        sink.finished();
        assert_eq!(sink.steps, vec![1]);
        assert_eq!(sink.highlights, vec![4]);
    }
}
