use log::{Level, log_enabled, warn};
use std::time::{Duration, Instant};

/// Scoped timer tracing entry and exit of a collision phase.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("⏱️ start {label}");
        }
        Self {
            label,
            start: Instant::now(),
        }
    }

    /// Elapsed time since the timer was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            let elapsed = self.start.elapsed();
            log::trace!("⏱️ end {} ({} µs)", self.label, elapsed.as_micros());
        }
    }
}

/// Logs a warning when a collision pass runs past its soft time budget.
pub fn warn_if_budget_exceeded(label: &str, duration: Duration, budget_ms: f32) {
    if duration.as_secs_f32() * 1000.0 > budget_ms {
        warn!(
            "{label} exceeded budget: {:.2} ms > {:.2} ms",
            duration.as_secs_f32() * 1000.0,
            budget_ms
        );
    }
}
