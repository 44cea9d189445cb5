//! Inference Pipeline Tests
//!
//! Drives `BioSignalInference` with synthetic biosignals.
//! Verifies:
//! - Tempo trigger on high arousal + high effort
//! - Bounded outputs under random and hostile input
//! - Window bounds and warm-up behaviour

use bj_core::InferenceConfig;
use bj_features::{BioSignalInference, SignalFrame};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::PI;

const SAMPLE_RATE: f32 = 250.0;

/// Multi-channel EEG with a strong beta (20 Hz) and weak alpha (10 Hz) component
fn beta_dominant_eeg(rows: usize, offset: usize) -> SignalFrame {
    let mut data = Vec::with_capacity(rows * 8);
    for i in 0..rows {
        let t = (offset + i) as f32 / SAMPLE_RATE;
        let beta = 2.0 * (2.0 * PI * 20.0 * t).sin();
        let alpha = 0.2 * (2.0 * PI * 10.0 * t).sin();
        for _ in 0..8 {
            data.push(beta + alpha);
        }
    }
    SignalFrame::new(data, 8).unwrap()
}

fn constant(rows: usize, channels: usize, value: f32) -> SignalFrame {
    SignalFrame::new(vec![value; rows * channels], channels).unwrap()
}

fn random_frame(rng: &mut ChaCha8Rng, rows: usize, channels: usize, scale: f32) -> SignalFrame {
    let data = (0..rows * channels)
        .map(|_| rng.random_range(-scale..scale))
        .collect();
    SignalFrame::new(data, channels).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRIGGER
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_high_arousal_high_effort_fires_trigger() {
    let mut bio = BioSignalInference::new(InferenceConfig::default()).unwrap();

    let mut style = None;
    for block in 0..5 {
        style = Some(
            bio.process_frame(
                &beta_dominant_eeg(50, block * 50),
                &constant(50, 2, 0.0),
                &constant(50, 1, 0.8),
            )
            .unwrap(),
        );
    }
    let style = style.unwrap();

    assert!(style.arousal > 0.8, "arousal {}", style.arousal);
    assert!(style.effort > 0.7, "effort {}", style.effort);
    assert_eq!(style.tempo_density, 1.0);
    assert!(bio.is_triggered());
    assert_eq!(bio.triggered_bpm(), 180);

    let powers = bio.band_powers().unwrap();
    assert!(powers.beta > powers.alpha);
}

#[test]
fn test_low_effort_does_not_trigger() {
    let mut bio = BioSignalInference::new(InferenceConfig::default()).unwrap();
    for block in 0..5 {
        bio.process_frame(
            &beta_dominant_eeg(50, block * 50),
            &constant(50, 2, 0.0),
            &constant(50, 1, 0.1),
        )
        .unwrap();
    }
    assert!(!bio.is_triggered());
}

// ═══════════════════════════════════════════════════════════════════════════════
// BOUNDS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_random_input_stays_bounded() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut bio = BioSignalInference::new(InferenceConfig::default()).unwrap();

    for _ in 0..60 {
        let rows = rng.random_range(0..40);
        let scale = rng.random_range(0.001..1000.0);
        let style = bio
            .process_frame(
                &random_frame(&mut rng, rows, 8, scale),
                &random_frame(&mut rng, rows, 2, scale),
                &random_frame(&mut rng, rows, 1, scale),
            )
            .unwrap();
        assert!(style.is_bounded(), "unbounded style {style:?}");
    }
}

#[test]
fn test_hostile_values_stay_bounded() {
    let mut bio = BioSignalInference::new(InferenceConfig::default()).unwrap();
    let hostile = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, f32::MAX, -f32::MAX, 0.0];

    for round in 0..30 {
        let eeg: Vec<f32> = (0..8 * 10).map(|i| hostile[(i + round) % hostile.len()]).collect();
        let fnirs: Vec<f32> = (0..2 * 10).map(|i| hostile[(i + round) % hostile.len()]).collect();
        let emg: Vec<f32> = (0..10).map(|i| hostile[(i + round) % hostile.len()]).collect();
        let style = bio
            .process_frame(
                &SignalFrame::new(eeg, 8).unwrap(),
                &SignalFrame::new(fnirs, 2).unwrap(),
                &SignalFrame::mono(emg),
            )
            .unwrap();
        assert!(style.is_bounded(), "unbounded style {style:?}");
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WINDOWS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_window_never_exceeds_capacity() {
    let config = InferenceConfig {
        buffer_size: 64,
        min_samples_eeg: 32,
        min_samples_fnirs: 16,
        min_samples_emg: 16,
        ..InferenceConfig::default()
    };
    let mut bio = BioSignalInference::new(config).unwrap();
    for _ in 0..10 {
        bio.process_frame(&constant(50, 8, 0.3), &constant(50, 2, 0.3), &constant(50, 1, 0.3))
            .unwrap();
    }
    let powers = bio.band_powers().unwrap();
    // A constant window puts all power in the DC bin, outside every band
    assert!(powers.alpha < 1e-6);
    assert!(powers.beta < 1e-6);
    assert!(powers.delta < 1e-6);
    assert!(bio.performance_stats().mean_ms >= 0.0);
}

#[test]
fn test_process_rows_matches_frames() {
    let mut a = BioSignalInference::new(InferenceConfig::default()).unwrap();
    let mut b = BioSignalInference::new(InferenceConfig::default()).unwrap();

    let eeg_rows: Vec<Vec<f32>> = (0..120).map(|i| vec![(i as f32 * 0.37).sin(); 8]).collect();
    let fnirs_rows: Vec<Vec<f32>> = (0..120).map(|i| vec![i as f32 * 0.001, 0.0]).collect();
    let emg_rows: Vec<Vec<f32>> = (0..120).map(|_| vec![0.6]).collect();

    let from_rows = a.process_rows(&eeg_rows, &fnirs_rows, &emg_rows).unwrap();
    let from_frames = b
        .process_frame(
            &SignalFrame::from_rows(&eeg_rows).unwrap(),
            &SignalFrame::from_rows(&fnirs_rows).unwrap(),
            &SignalFrame::from_rows(&emg_rows).unwrap(),
        )
        .unwrap();
    assert_eq!(from_rows, from_frames);
}
