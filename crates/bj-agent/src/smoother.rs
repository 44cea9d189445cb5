//! Temporal smoothing of control vectors
//!
//! Sliding-window smoother for jittery performer input. A session installs
//! one ahead of the agent and sequence memory when configured to. Three modes:
//!
//! - **Exponential**: `s = α·s_prev + (1 − α)·x`, seeded with the first input
//! - **MovingAverage**: mean over the window
//! - **Median**: per-control median over the window

use bj_core::{ControlVector, RingBuffer, clamp_unit};
use serde::{Deserialize, Serialize};

/// Smoothing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMode {
    #[default]
    Exponential,
    MovingAverage,
    Median,
}

/// Default EMA weight of the previous value
pub const DEFAULT_SMOOTHER_ALPHA: f32 = 0.7;

/// Default window length
pub const DEFAULT_SMOOTHER_WINDOW: usize = 10;

/// Width of the flattened history embedding
const EMBEDDING_DIM: usize = 8;

/// Sliding-window control smoother
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    mode: SmoothingMode,
    alpha: f32,
    history: RingBuffer<[f32; 4]>,
    ema: Option<[f32; 4]>,
}

impl TemporalSmoother {
    pub fn new(mode: SmoothingMode, window_size: usize) -> Self {
        Self {
            mode,
            alpha: DEFAULT_SMOOTHER_ALPHA,
            history: RingBuffer::new(window_size),
            ema: None,
        }
    }

    pub fn mode(&self) -> SmoothingMode {
        self.mode
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Higher = smoother; clamped to [0, 1]
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = clamp_unit(alpha);
    }

    pub fn window_size(&self) -> usize {
        self.history.capacity()
    }

    /// Record `controls` and return the smoothed vector
    pub fn update(&mut self, controls: &ControlVector) -> ControlVector {
        let x = controls.to_array();
        self.history.push(x);

        let smoothed = match self.mode {
            SmoothingMode::Exponential => {
                let a = self.alpha;
                let next = match self.ema {
                    Some(prev) => std::array::from_fn(|i| a * prev[i] + (1.0 - a) * x[i]),
                    None => x,
                };
                self.ema = Some(next);
                next
            }
            SmoothingMode::MovingAverage => {
                let n = self.history.len() as f32;
                let mut sum = [0.0f32; 4];
                for row in self.history.iter() {
                    for (s, v) in sum.iter_mut().zip(row) {
                        *s += v;
                    }
                }
                sum.map(|s| s / n)
            }
            SmoothingMode::Median => std::array::from_fn(|i| {
                let mut column: Vec<f32> = self.history.iter().map(|row| row[i]).collect();
                median(&mut column)
            }),
        };

        ControlVector::from_array(smoothed)
    }

    /// Last minus previous input, zeros with fewer than two entries
    pub fn velocity(&self) -> [f32; 4] {
        let mut newest = self.history.iter().rev();
        match (newest.next(), newest.next()) {
            (Some(current), Some(previous)) => std::array::from_fn(|i| current[i] - previous[i]),
            _ => [0.0; 4],
        }
    }

    /// Flattened history (oldest first), truncated or zero-padded to a fixed width
    pub fn embedding(&self) -> Vec<f32> {
        let dim = EMBEDDING_DIM.min(self.window_size() * 4);
        let mut flat: Vec<f32> = self
            .history
            .iter()
            .flat_map(|row| row.iter().copied())
            .take(dim)
            .map(clamp_unit)
            .collect();
        flat.resize(dim, 0.0);
        flat
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.ema = None;
    }
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new(SmoothingMode::Exponential, DEFAULT_SMOOTHER_WINDOW)
    }
}

fn median(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        0.5 * (values[mid - 1] + values[mid])
    } else {
        values[mid]
    }
}
