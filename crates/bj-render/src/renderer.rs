//! Renderer contract
//!
//! [`ContractRenderer`] wraps any [`Voice`] (the synthesis recipe) and
//! enforces the output contract around it:
//!
//! 1. Per-parameter exponential smoothing, persistent across chunks
//! 2. Linear per-sample ramp from the previous to the new smoothed values
//! 3. Output clamped to [−1, 1] (non-finite samples become silence)
//! 4. Linear fade at both chunk edges
//!
//! `generate(duration, target)` always returns `duration · sample_rate`
//! samples (truncated), or nothing for a non-positive duration.

use crate::smoothing::{EdgeFade, ParamSmoother};
use bj_core::{BjResult, ControlVector, ResponseVector, SmoothingConfig, StyleVector};

/// Parameter names for control-vector driven renderers
pub const CONTROL_PARAMS: [&str; 4] = ["control_1", "control_2", "control_3", "control_4"];

/// Parameter names for style-vector driven renderers
pub const STYLE_PARAMS: [&str; 4] = [
    "tempo_density",
    "harmonic_tension",
    "spectral_brightness",
    "noise_balance",
];

/// Resting values of the style parameters before the first chunk
pub const STYLE_INITIAL: [f32; 4] = [0.5, 0.3, 0.6, 0.2];

/// Anything that can drive a renderer's four parameters
pub trait RenderParams {
    fn render_params(&self) -> [f32; 4];
}

impl RenderParams for ControlVector {
    fn render_params(&self) -> [f32; 4] {
        self.to_array()
    }
}

impl RenderParams for StyleVector {
    fn render_params(&self) -> [f32; 4] {
        self.renderer_params()
    }
}

impl RenderParams for ResponseVector {
    fn render_params(&self) -> [f32; 4] {
        self.as_controls().to_array()
    }
}

impl RenderParams for [f32; 4] {
    fn render_params(&self) -> [f32; 4] {
        *self
    }
}

/// Synthesis recipe seam
///
/// Receives already smoothed parameters, one call per output sample.
pub trait Voice: Send {
    /// Next output sample; values outside [−1, 1] are clamped by the renderer
    fn next_sample(&mut self, params: &[f32; 4]) -> f32;

    /// Called once at construction and on sample rate changes
    fn set_sample_rate(&mut self, _sample_rate: u32) {}

    /// Drop oscillator/filter state
    fn reset(&mut self) {}
}

/// Renderer that enforces smoothing, bounds and edge fades around a voice
#[derive(Debug)]
pub struct ContractRenderer<V: Voice> {
    voice: V,
    smoother: ParamSmoother,
    fade: EdgeFade,
    sample_rate: u32,
}

impl<V: Voice> ContractRenderer<V> {
    /// Renderer with explicit parameter names and resting values
    pub fn new(
        mut voice: V,
        names: [&'static str; 4],
        initial: [f32; 4],
        config: &SmoothingConfig,
    ) -> BjResult<Self> {
        let smoother = ParamSmoother::new(names, initial, config)?;
        voice.set_sample_rate(config.sample_rate);
        log::debug!(
            "ContractRenderer: {:?} @ {} Hz, alphas {:?}, fade {} ms",
            names,
            config.sample_rate,
            smoother.alphas(),
            config.fade_ms
        );
        Ok(Self {
            voice,
            smoother,
            fade: EdgeFade::new(config.fade_ms, config.sample_rate),
            sample_rate: config.sample_rate,
        })
    }

    /// Renderer driven by control vectors (neutral resting values)
    pub fn for_controls(voice: V, config: &SmoothingConfig) -> BjResult<Self> {
        Self::new(voice, CONTROL_PARAMS, [0.5; 4], config)
    }

    /// Renderer driven by style vectors
    pub fn for_style(voice: V, config: &SmoothingConfig) -> BjResult<Self> {
        Self::new(voice, STYLE_PARAMS, STYLE_INITIAL, config)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Current smoothed parameters
    pub fn params(&self) -> [f32; 4] {
        self.smoother.current()
    }

    pub fn smoother(&self) -> &ParamSmoother {
        &self.smoother
    }

    pub fn voice(&self) -> &V {
        &self.voice
    }

    pub fn voice_mut(&mut self) -> &mut V {
        &mut self.voice
    }

    /// Number of samples `generate` returns for `duration_secs`
    pub fn chunk_len(&self, duration_secs: f32) -> usize {
        if !(duration_secs.is_finite() && duration_secs > 0.0) {
            return 0;
        }
        (duration_secs * self.sample_rate as f32) as usize
    }

    /// Render one chunk
    pub fn generate(&mut self, duration_secs: f32, target: &impl RenderParams) -> Vec<f32> {
        let mut out = vec![0.0; self.chunk_len(duration_secs)];
        self.generate_into(&mut out, target);
        out
    }

    /// Render into a caller-provided buffer (no allocation)
    pub fn generate_into(&mut self, out: &mut [f32], target: &impl RenderParams) {
        if out.is_empty() {
            return;
        }
        let from = self.smoother.current();
        let to = self.smoother.update(target.render_params());

        let step = 1.0 / out.len() as f32;
        for (i, sample) in out.iter_mut().enumerate() {
            let t = (i + 1) as f32 * step;
            let params: [f32; 4] = std::array::from_fn(|k| from[k] + (to[k] - from[k]) * t);
            let value = self.voice.next_sample(&params);
            *sample = if value.is_finite() {
                value.clamp(-1.0, 1.0)
            } else {
                0.0
            };
        }

        self.fade.apply(out);
    }

    /// Reset smoothing and voice state
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.voice.reset();
    }
}
