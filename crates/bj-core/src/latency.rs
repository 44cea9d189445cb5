//! Processing-time observability
//!
//! Keeps the last N wall-clock measurements in a ring buffer and derives
//! summary statistics on demand. Recording is O(1) and allocation-free.

use crate::ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of retained measurements
pub const DEFAULT_LATENCY_WINDOW: usize = 100;

/// Summary of recent processing times (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatencyStats {
    pub mean_ms: f64,
    /// Population standard deviation
    pub std_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    /// 95th percentile, linear interpolation between ranks
    pub p95_ms: f64,
}

/// Bounded latency recorder
#[derive(Debug, Clone)]
pub struct LatencyMonitor {
    samples: RingBuffer<f64>,
}

impl Default for LatencyMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY_WINDOW)
    }
}

impl LatencyMonitor {
    pub fn new(window: usize) -> Self {
        Self {
            samples: RingBuffer::new(window),
        }
    }

    /// Record one measurement in milliseconds
    #[inline]
    pub fn record_ms(&mut self, ms: f64) {
        if ms.is_finite() {
            self.samples.push(ms.max(0.0));
        }
    }

    #[inline]
    pub fn record(&mut self, elapsed: Duration) {
        self.record_ms(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent measurement
    pub fn last_ms(&self) -> Option<f64> {
        self.samples.last().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Compute statistics over the retained window (zeros when empty)
    pub fn stats(&self) -> LatencyStats {
        if self.samples.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted = self.samples.snapshot();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let var = sorted.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;

        LatencyStats {
            mean_ms: mean,
            std_ms: var.sqrt(),
            min_ms: sorted[0],
            max_ms: sorted[sorted.len() - 1],
            p95_ms: percentile(&sorted, 95.0),
        }
    }
}

/// Percentile of an ascending slice with linear interpolation
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_stats() {
        let monitor = LatencyMonitor::default();
        assert_eq!(monitor.stats(), LatencyStats::default());
    }

    #[test]
    fn test_stats_values() {
        let mut monitor = LatencyMonitor::new(100);
        for ms in 1..=100 {
            monitor.record_ms(ms as f64);
        }
        let stats = monitor.stats();
        assert_relative_eq!(stats.mean_ms, 50.5);
        assert_relative_eq!(stats.min_ms, 1.0);
        assert_relative_eq!(stats.max_ms, 100.0);
        // rank = 0.95 * 99 = 94.05 → 95 + 0.05
        assert_relative_eq!(stats.p95_ms, 95.05, epsilon = 1e-9);
        assert_relative_eq!(stats.std_ms, (9999.0f64 / 12.0).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_window_is_bounded() {
        let mut monitor = LatencyMonitor::new(10);
        for i in 0..50 {
            monitor.record_ms(i as f64);
        }
        assert_eq!(monitor.len(), 10);
        assert_relative_eq!(monitor.stats().min_ms, 40.0);
        assert_eq!(monitor.last_ms(), Some(49.0));
    }

    #[test]
    fn test_nonfinite_ignored() {
        let mut monitor = LatencyMonitor::new(4);
        monitor.record_ms(f64::NAN);
        monitor.record_ms(f64::INFINITY);
        assert!(monitor.is_empty());
    }
}
