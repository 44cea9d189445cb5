//! Interaction logging
//!
//! Per-step latency plus the render controls sent to the renderer, kept in
//! bounded buffers for end-of-session summaries.

use bj_core::{ControlVector, DEFAULT_LATENCY_WINDOW, LatencyMonitor, LatencyStats, RingBuffer};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// End-of-session summary
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub steps: u64,
    pub latency: LatencyStats,
    /// Mean absolute frame-to-frame change per control
    pub stability: [f32; 4],
}

/// Bounded record of recent steps
#[derive(Debug, Clone)]
pub struct InteractionLogger {
    latency: LatencyMonitor,
    controls: RingBuffer<ControlVector>,
    steps: u64,
}

impl Default for InteractionLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY_WINDOW)
    }
}

impl InteractionLogger {
    pub fn new(window: usize) -> Self {
        Self {
            latency: LatencyMonitor::new(window),
            controls: RingBuffer::new(window),
            steps: 0,
        }
    }

    /// Record one step
    pub fn record(&mut self, elapsed: Duration, render_controls: ControlVector) {
        self.latency.record(elapsed);
        self.controls.push(render_controls);
        self.steps += 1;
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn latency_stats(&self) -> LatencyStats {
        self.latency.stats()
    }

    /// Retained render controls, oldest first
    pub fn controls(&self) -> Vec<ControlVector> {
        self.controls.snapshot()
    }

    /// Mean absolute frame-to-frame change per control (zeros with < 2 frames)
    pub fn stability(&self) -> [f32; 4] {
        if self.controls.len() < 2 {
            return [0.0; 4];
        }
        let mut sum = [0.0f32; 4];
        let mut prev: Option<[f32; 4]> = None;
        for c in self.controls.iter() {
            let cur = c.to_array();
            if let Some(p) = prev {
                for ((s, c), p) in sum.iter_mut().zip(cur).zip(p) {
                    *s += (c - p).abs();
                }
            }
            prev = Some(cur);
        }
        let n = (self.controls.len() - 1) as f32;
        sum.map(|s| s / n)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            steps: self.steps,
            latency: self.latency_stats(),
            stability: self.stability(),
        }
    }

    pub fn clear(&mut self) {
        self.latency.clear();
        self.controls.clear();
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stability_needs_two_frames() {
        let mut log = InteractionLogger::default();
        assert_eq!(log.stability(), [0.0; 4]);
        log.record(Duration::from_millis(1), ControlVector::splat(0.5));
        assert_eq!(log.stability(), [0.0; 4]);
    }

    #[test]
    fn test_stability_mean_abs_change() {
        let mut log = InteractionLogger::default();
        for v in [0.0, 0.5, 0.25] {
            log.record(Duration::from_millis(1), ControlVector::new(v, 0.5, 0.5, 0.5));
        }
        let s = log.stability();
        assert!((s[0] - 0.375).abs() < 1e-6);
        assert_eq!(s[1], 0.0);
    }

    #[test]
    fn test_summary_and_clear() {
        let mut log = InteractionLogger::new(4);
        for _ in 0..6 {
            log.record(Duration::from_millis(2), ControlVector::default());
        }
        let summary = log.summary();
        assert_eq!(summary.steps, 6);
        assert_eq!(log.len(), 4);
        assert!((summary.latency.mean_ms - 2.0).abs() < 1e-9);
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.summary(), SessionSummary::default());
    }
}
