//! Progress reporting for pipeline runs.
//!
//! The pipeline emits an event for every stage, package format and
//! per-target step it executes. Events carry enough position information
//! for a renderer to print `[step/total]` prefixes at the right indent
//! without knowing anything about the pipeline itself.
//!
//! Totals are fixed when a run starts: the stage total comes from the
//! requested [`crate::Action`] and the format total from the number of
//! formats the manifest enables. They never change mid-run, so two runs
//! of the same configuration number their steps identically.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A unit of pipeline work that is about to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Human-readable description of the step
    pub label: String,
    /// One-based position within the enclosing sequence
    pub step: usize,
    /// Length of the enclosing sequence
    pub total: usize,
    /// Nesting depth, zero for pipeline stages
    pub depth: usize,
    /// Whether this step is a child of the previous event at `depth - 1`
    pub substep: bool,
}

/// A failure that was contained instead of aborting the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEvent {
    /// Description of what failed and why
    pub message: String,
    /// One-based position of the step that failed
    pub step: usize,
    /// Length of the enclosing sequence
    pub total: usize,
    /// Nesting depth of the failed step
    pub depth: usize,
}

/// Receiver for pipeline progress events
///
/// Implementations must be cheap to call; the pipeline reports every
/// step through this trait on its own task.
pub trait ProgressSink: Send + Sync {
    /// Called before a unit of work starts
    fn step(&self, event: ProgressEvent);

    /// Called when a unit of work fails without aborting the run
    fn failure(&self, event: FailureEvent);
}

/// Progress context for one pipeline run
///
/// Wraps the sink with the run's fixed totals and counts contained
/// failures so the caller can report them once the run finishes.
#[derive(Clone)]
pub struct Progress {
    sink: Arc<dyn ProgressSink>,
    stages: usize,
    formats: usize,
    failures: Arc<AtomicUsize>,
}

impl Progress {
    /// Creates a progress context with fixed stage and format totals
    pub fn new(sink: Arc<dyn ProgressSink>, stages: usize, formats: usize) -> Self {
        Self {
            sink,
            stages,
            formats,
            failures: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Announces a pipeline stage at depth zero
    pub fn stage(&self, label: impl Into<String>, step: usize) {
        self.sink.step(ProgressEvent {
            label: label.into(),
            step,
            total: self.stages,
            depth: 0,
            substep: false,
        });
    }

    /// Reports a failure scoped to a pipeline stage
    pub fn stage_failure(&self, message: impl Into<String>, step: usize) {
        self.failure(message, step, self.stages, 0);
    }

    /// Announces a package format step at depth one
    pub fn format(&self, label: impl Into<String>, step: usize) {
        self.sink.step(ProgressEvent {
            label: label.into(),
            step,
            total: self.formats,
            depth: 1,
            substep: false,
        });
    }

    /// Reports a failure scoped to a package format
    pub fn format_failure(&self, message: impl Into<String>, step: usize) {
        self.failure(message, step, self.formats, 1);
    }

    /// Announces an arbitrary step, used for per-target substeps
    pub fn step(&self, label: impl Into<String>, step: usize, total: usize, depth: usize) {
        self.sink.step(ProgressEvent {
            label: label.into(),
            step,
            total,
            depth,
            substep: true,
        });
    }

    /// Reports a failure at an arbitrary position
    pub fn failure(&self, message: impl Into<String>, step: usize, total: usize, depth: usize) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.sink.failure(FailureEvent {
            message: message.into(),
            step,
            total,
            depth,
        });
    }

    /// Number of failures reported so far
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        steps: Mutex<Vec<ProgressEvent>>,
        failures: Mutex<Vec<FailureEvent>>,
    }

    impl ProgressSink for Recorder {
        fn step(&self, event: ProgressEvent) {
            self.steps.lock().unwrap().push(event);
        }

        fn failure(&self, event: FailureEvent) {
            self.failures.lock().unwrap().push(event);
        }
    }

    #[test]
    fn stage_events_use_the_fixed_stage_total() {
        let recorder = Arc::new(Recorder::default());
        let progress = Progress::new(recorder.clone(), 3, 2);

        progress.stage("Cleaning", 1);
        progress.stage("Building binaries", 2);

        let steps = recorder.steps.lock().unwrap();
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|e| e.total == 3 && e.depth == 0));
        assert_eq!(steps[0].step, 1);
        assert_eq!(steps[1].step, 2);
    }

    #[test]
    fn format_events_use_the_fixed_format_total() {
        let recorder = Arc::new(Recorder::default());
        let progress = Progress::new(recorder.clone(), 3, 4);

        progress.format("Packaging deb", 1);
        progress.format("Packaging appimage", 4);

        let steps = recorder.steps.lock().unwrap();
        assert!(steps.iter().all(|e| e.total == 4 && e.depth == 1));
    }

    #[test]
    fn failures_are_counted_across_clones() {
        let recorder = Arc::new(Recorder::default());
        let progress = Progress::new(recorder.clone(), 3, 2);
        let clone = progress.clone();

        progress.stage_failure("one", 2);
        clone.format_failure("two", 1);

        assert_eq!(progress.failures(), 2);
        assert_eq!(clone.failures(), 2);
        assert_eq!(recorder.failures.lock().unwrap().len(), 2);
    }

    #[test]
    fn substeps_carry_their_own_position() {
        let recorder = Arc::new(Recorder::default());
        let progress = Progress::new(recorder.clone(), 3, 2);

        progress.step("Building linux/amd64", 2, 5, 1);

        let steps = recorder.steps.lock().unwrap();
        assert_eq!(steps[0].step, 2);
        assert_eq!(steps[0].total, 5);
        assert_eq!(steps[0].depth, 1);
        assert!(steps[0].substep);
    }
}
