//! Latency deadline watchdog
//!
//! Observes hot-path durations against the configured budget. An overrun is
//! counted and logged; the observed call always completes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Overrun counters at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WatchdogReport {
    pub budget_ms: f64,
    pub observed: u64,
    pub overruns: u64,
    pub worst_ms: f64,
}

/// Counts calls that exceed a latency budget
#[derive(Debug, Clone)]
pub struct DeadlineWatchdog {
    budget_ms: f64,
    observed: u64,
    overruns: u64,
    worst_ms: f64,
}

impl DeadlineWatchdog {
    pub fn new(budget_ms: f64) -> Self {
        Self {
            budget_ms,
            observed: 0,
            overruns: 0,
            worst_ms: 0.0,
        }
    }

    pub fn budget_ms(&self) -> f64 {
        self.budget_ms
    }

    /// Record one duration; returns true if it exceeded the budget
    pub fn observe(&mut self, label: &str, elapsed: Duration) -> bool {
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.observe_ms(label, ms)
    }

    /// Millisecond variant of [`DeadlineWatchdog::observe`]
    pub fn observe_ms(&mut self, label: &str, ms: f64) -> bool {
        if !ms.is_finite() {
            return false;
        }
        self.observed += 1;
        self.worst_ms = self.worst_ms.max(ms);
        if ms > self.budget_ms {
            self.overruns += 1;
            log::warn!(
                "{label} took {ms:.2} ms, over the {:.1} ms budget ({} overruns)",
                self.budget_ms,
                self.overruns
            );
            return true;
        }
        false
    }

    pub fn observed(&self) -> u64 {
        self.observed
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn worst_ms(&self) -> f64 {
        self.worst_ms
    }

    pub fn report(&self) -> WatchdogReport {
        WatchdogReport {
            budget_ms: self.budget_ms,
            observed: self.observed,
            overruns: self.overruns,
            worst_ms: self.worst_ms,
        }
    }

    pub fn reset(&mut self) {
        self.observed = 0;
        self.overruns = 0;
        self.worst_ms = 0.0;
    }
}
