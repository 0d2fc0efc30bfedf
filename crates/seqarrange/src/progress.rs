//! Progress reporting and the wall-clock deadline.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tracing::warn;

/// Forwards progress to an optional caller callback.
///
/// Reported values are clamped to `0..=100` and never decrease. A callback
/// that panics is dropped and never called again; the run goes on.
pub struct ProgressReporter<'a> {
    callback: Option<&'a mut dyn FnMut(u8)>,
    last: Option<u8>,
}

impl<'a> ProgressReporter<'a> {
    /// Wrap an optional callback.
    pub fn new(callback: Option<&'a mut dyn FnMut(u8)>) -> Self {
        Self {
            callback,
            last: None,
        }
    }

    /// Reporter that discards everything.
    pub fn silent() -> Self {
        Self::new(None)
    }

    /// Last value forwarded.
    pub fn last(&self) -> u8 {
        self.last.unwrap_or(0)
    }

    /// Report a percentage.
    pub fn report(&mut self, percent: f64) {
        if percent.is_nan() {
            return;
        }
        let value = percent.clamp(0.0, 100.0) as u8;
        if self.last.is_some_and(|last| value <= last) {
            return;
        }
        self.last = Some(value);

        if let Some(callback) = self.callback.as_mut() {
            if catch_unwind(AssertUnwindSafe(|| callback(value))).is_err() {
                warn!("Progress callback panicked, further progress is not reported");
                self.callback = None;
            }
        }
    }

    /// Report `done` out of `total` steps, scaled into `[from, to]` percent.
    pub fn report_fraction(&mut self, done: usize, total: usize, from: f64, to: f64) {
        let fraction = if total == 0 {
            1.0
        } else {
            done.min(total) as f64 / total as f64
        };
        self.report(from + (to - from) * fraction);
    }

    /// Report completion.
    pub fn finish(&mut self) {
        self.report(100.0);
    }
}

impl std::fmt::Debug for ProgressReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("has_callback", &self.callback.is_some())
            .field("last", &self.last)
            .finish()
    }
}

/// Wall-clock budget of a run, checked at loop boundaries.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a budget now.
    pub fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    /// Time spent so far.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time spent so far, in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Has the budget run out?
    pub fn expired(&self) -> bool {
        self.elapsed() >= self.budget
    }
}
