//! Renderer Contract Tests
//!
//! Verifies:
//! - Step changes in the control vector never produce a jump in the audio
//! - Concatenated chunks are click-free at the seams
//! - Output bounds for random targets and a hostile voice

use bj_core::{ControlVector, SmoothingConfig, StyleVector};
use bj_render::{ContractRenderer, Voice};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

const SAMPLE_RATE: u32 = 44100;

/// Sine whose amplitude and pitch follow the first two parameters
struct Tone {
    phase: f32,
    sample_rate: f32,
}

impl Tone {
    fn new() -> Self {
        Self {
            phase: 0.0,
            sample_rate: SAMPLE_RATE as f32,
        }
    }
}

impl Voice for Tone {
    fn next_sample(&mut self, params: &[f32; 4]) -> f32 {
        let freq = 110.0 + 330.0 * params[1];
        self.phase = (self.phase + TAU * freq / self.sample_rate) % TAU;
        params[0] * self.phase.sin()
    }

    fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate as f32;
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// DC level equal to the first parameter
struct Level;

impl Voice for Level {
    fn next_sample(&mut self, params: &[f32; 4]) -> f32 {
        params[0]
    }
}

/// Largest absolute difference between neighbouring samples
fn max_step(signal: &[f32]) -> f32 {
    signal
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f32::max)
}

#[test]
fn test_step_change_has_no_discontinuity() {
    let mut renderer = ContractRenderer::for_controls(Level, &SmoothingConfig::default()).unwrap();

    let mut audio = Vec::new();
    for chunk in 0..20 {
        let target = if chunk < 10 { 0.0 } else { 1.0 };
        audio.extend(renderer.generate(0.1, &ControlVector::splat(target)));
    }

    assert_eq!(audio.len(), 20 * 4410);
    // Edge fades dominate: at most one fade step of a sub-unity level
    assert!(max_step(&audio) < 0.02, "max step {}", max_step(&audio));
}

#[test]
fn test_chunk_seams_are_silent() {
    let mut renderer =
        ContractRenderer::for_style(Tone::new(), &SmoothingConfig::default()).unwrap();
    let style = StyleVector {
        tempo_density: 1.0,
        harmonic_tension: 0.8,
        spectral_brightness: 0.4,
        noise_balance: 0.1,
        ..StyleVector::default()
    };
    for _ in 0..5 {
        let chunk = renderer.generate(0.05, &style);
        assert_eq!(chunk.len(), 2205);
        assert_eq!(chunk[0], 0.0);
        assert_eq!(chunk[chunk.len() - 1], 0.0);
    }
}

#[test]
fn test_random_targets_stay_bounded() {
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    let mut renderer = ContractRenderer::for_controls(Tone::new(), &SmoothingConfig {
        default_alpha: 0.5,
        ..SmoothingConfig::default()
    })
    .unwrap();

    for _ in 0..50 {
        let target = ControlVector {
            control_1: rng.random_range(-5.0..5.0),
            control_2: rng.random_range(-5.0..5.0),
            control_3: rng.random_range(-5.0..5.0),
            control_4: rng.random_range(-5.0..5.0),
        };
        let duration = rng.random_range(0.0..0.05);
        let chunk = renderer.generate(duration, &target);
        assert_eq!(chunk.len(), renderer.chunk_len(duration));
        assert!(chunk.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(renderer.params().iter().all(|p| (0.0..=1.0).contains(p)));
    }
}

#[test]
fn test_reset_restarts_voice_and_smoothing() {
    let mut renderer =
        ContractRenderer::for_controls(Tone::new(), &SmoothingConfig::default()).unwrap();
    let first = renderer.generate(0.02, &ControlVector::splat(0.9));
    renderer.generate(0.02, &ControlVector::splat(0.1));
    renderer.reset();
    let again = renderer.generate(0.02, &ControlVector::splat(0.9));
    assert_eq!(first, again);
}
