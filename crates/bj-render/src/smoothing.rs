//! Control-rate parameter smoothing
//!
//! Every renderer parameter carries persistent one-pole state:
//!
//! ```text
//! smoothed = α · smoothed_prev + (1 − α) · target
//! ```
//!
//! applied once per generated chunk. Within a chunk the renderer ramps
//! linearly from the previous smoothed value to the new one, so a step in
//! the control vector never reaches the voice as a step.

use bj_core::{BjResult, SmoothingConfig, clamp_unit};

// ============ Smoothed Control ============

/// One exponentially smoothed parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedControl {
    current: f32,
    alpha: f32,
}

impl SmoothedControl {
    /// `alpha` is the weight of the previous value, clamped to [0, 1)
    pub fn new(initial: f32, alpha: f32) -> Self {
        Self {
            current: clamp_unit(initial),
            alpha: alpha.clamp(0.0, 0.999_999),
        }
    }

    /// Move toward `target` and return the new smoothed value
    #[inline]
    pub fn update(&mut self, target: f32) -> f32 {
        let target = clamp_unit(target);
        self.current = self.alpha * self.current + (1.0 - self.alpha) * target;
        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Jump straight to `value` (initialization only)
    pub fn set_immediate(&mut self, value: f32) {
        self.current = clamp_unit(value);
    }
}

// ============ Parameter Smoother ============

/// Named bank of smoothed renderer parameters
#[derive(Debug, Clone)]
pub struct ParamSmoother {
    names: [&'static str; 4],
    params: [SmoothedControl; 4],
    initial: [f32; 4],
}

impl ParamSmoother {
    /// Alphas are looked up per name in `config`
    pub fn new(
        names: [&'static str; 4],
        initial: [f32; 4],
        config: &SmoothingConfig,
    ) -> BjResult<Self> {
        config.validate()?;
        Ok(Self {
            names,
            params: std::array::from_fn(|i| {
                SmoothedControl::new(initial[i], config.alpha_for(names[i]))
            }),
            initial,
        })
    }

    pub fn names(&self) -> &[&'static str; 4] {
        &self.names
    }

    /// Smooth all four parameters toward `targets`
    pub fn update(&mut self, targets: [f32; 4]) -> [f32; 4] {
        std::array::from_fn(|i| self.params[i].update(targets[i]))
    }

    pub fn current(&self) -> [f32; 4] {
        self.params.map(|p| p.current())
    }

    /// Current value of a parameter by name
    pub fn get(&self, name: &str) -> Option<f32> {
        self.names
            .iter()
            .position(|n| *n == name)
            .map(|i| self.params[i].current())
    }

    pub fn alphas(&self) -> [f32; 4] {
        self.params.map(|p| p.alpha())
    }

    /// Back to the initial values
    pub fn reset(&mut self) {
        for (param, &value) in self.params.iter_mut().zip(self.initial.iter()) {
            param.set_immediate(value);
        }
    }
}

// ============ Edge Fade ============

/// Linear fade-in/out at chunk edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFade {
    fade_ms: f32,
    sample_rate: u32,
}

impl EdgeFade {
    pub fn new(fade_ms: f32, sample_rate: u32) -> Self {
        Self {
            fade_ms: fade_ms.max(0.0),
            sample_rate,
        }
    }

    /// Fade length for a chunk: the configured time, at most a tenth of the
    /// chunk, and at least one sample whenever fading is enabled and the
    /// chunk has two or more samples
    pub fn fade_len(&self, chunk_len: usize) -> usize {
        if self.fade_ms <= 0.0 || chunk_len < 2 {
            return 0;
        }
        let configured = (self.fade_ms * self.sample_rate as f32 / 1000.0) as usize;
        configured.min(chunk_len / 10).max(1)
    }

    /// Ramp both ends so the first and last samples are exactly zero
    pub fn apply(&self, chunk: &mut [f32]) {
        let n = self.fade_len(chunk.len());
        if n == 0 {
            return;
        }
        let len = chunk.len();
        for i in 0..n {
            let gain = i as f32 / n as f32;
            chunk[i] *= gain;
            chunk[len - 1 - i] *= gain;
        }
    }
}
